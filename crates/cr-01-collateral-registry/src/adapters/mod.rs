//! Adapters layer (Hexagonal Architecture)

mod clock;
mod event_log;
mod policy;
mod treasury;

pub use clock::*;
pub use event_log::*;
pub use policy::*;
pub use treasury::*;
