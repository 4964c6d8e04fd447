//! # Collateral Registry Benchmarks
//!
//! | Area | Operation |
//! |------|-----------|
//! | cr-01 Distributor | proportional slash-then-freeze over N backers |
//! | cr-01 Status Engine | recompute one proposer over N backers |
//! | cr-02 Policy VM | constant and context-driven modules |
//! | cr-03 Authorization | policy signature recovery |

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use cr_01_collateral_registry::LedgerState;
use cr_02_policy_vm::{fixtures, PolicyEvaluator};
use cr_03_signature_verification::test_helpers::{generate_keypair, proposer_address, sign_policy};
use cr_03_signature_verification::PolicyAuthorizer;
use shared_types::{units, Address, Penalty, U256};
use std::time::Duration;

const PROPOSER: Address = Address::repeat_byte(0xA0);

fn ledger_with_backers(count: u32) -> LedgerState {
    let mut ledger = LedgerState::new();
    for i in 0..count {
        let mut bytes = [0u8; 20];
        bytes[16..].copy_from_slice(&(i + 1).to_be_bytes());
        let who = Address::from(bytes);
        ledger.register(who, units::ether(32), 0, 0).expect("register");
        ledger.delegate(who, &[PROPOSER]).expect("delegate");
    }
    ledger
}

// ============================================================================
// CR-01: Distribution and status
// ============================================================================

fn bench_penalty_distribution(c: &mut Criterion) {
    let mut group = c.benchmark_group("cr-01-distribution");
    group.measurement_time(Duration::from_secs(5));
    let penalty = Penalty::new(units::ether(10), units::ether(5), 100);

    for count in [10u32, 100, 1_000] {
        let ledger = ledger_with_backers(count);
        group.throughput(Throughput::Elements(u64::from(count)));
        group.bench_with_input(BenchmarkId::new("distribute_penalty", count), &ledger, |b, ledger| {
            b.iter_batched(
                || ledger.clone(),
                |mut ledger| black_box(ledger.distribute_penalty(PROPOSER, &penalty)),
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_status_recompute(c: &mut Criterion) {
    let mut group = c.benchmark_group("cr-01-status");

    for count in [10u32, 100, 1_000] {
        let ledger = ledger_with_backers(count);
        group.bench_with_input(BenchmarkId::new("update_status", count), &ledger, |b, ledger| {
            b.iter_batched(
                || ledger.clone(),
                |mut ledger| black_box(ledger.update_status(&[PROPOSER], 1, units::ether(1))),
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

// ============================================================================
// CR-02: Policy VM
// ============================================================================

fn bench_policy_evaluation(c: &mut Criterion) {
    let mut group = c.benchmark_group("cr-02-policy-vm");
    let evaluator = PolicyEvaluator::default();
    let penalty = Penalty::new(units::ether(1), units::ether(1), 10);

    let constant = fixtures::constant_penalty(&penalty);
    group.bench_function("constant_penalty", |b| {
        b.iter(|| black_box(evaluator.evaluate(&constant, PROPOSER, &[])));
    });

    let context_module = fixtures::context_penalty();
    let context = fixtures::encode_context(&penalty);
    group.bench_function("context_penalty", |b| {
        b.iter(|| black_box(evaluator.evaluate(&context_module, PROPOSER, &context)));
    });

    let looping = fixtures::infinite_loop();
    group.sample_size(10);
    group.bench_function("infinite_loop_to_limit", |b| {
        b.iter(|| black_box(evaluator.evaluate(&looping, PROPOSER, &[]).is_err()));
    });
    group.finish();
}

// ============================================================================
// CR-03: Authorization
// ============================================================================

fn bench_policy_authorization(c: &mut Criterion) {
    let mut group = c.benchmark_group("cr-03-authorization");
    let authorizer = PolicyAuthorizer::new();
    let (key, _) = generate_keypair();
    let proposer = proposer_address(&key);
    let module = fixtures::constant_penalty(&Penalty::new(U256::one(), U256::zero(), 0));
    let signature = sign_policy(&module, &key);

    group.bench_function("verify_policy_signature", |b| {
        b.iter(|| black_box(authorizer.verify(proposer, &module, &signature).is_ok()));
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_penalty_distribution,
    bench_status_recompute,
    bench_policy_evaluation,
    bench_policy_authorization,
);
criterion_main!(benches);
