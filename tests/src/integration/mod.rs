//! End-to-end flows over `RegistryApi`.

mod ledger_flows;
mod penalty_flows;
mod status_flows;
