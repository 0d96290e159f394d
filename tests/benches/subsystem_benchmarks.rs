//! # Shard-Chain Subsystem Benchmarks
//!
//! | Subsystem | Operation | Scales with |
//! |-----------|-----------|-------------|
//! | sc-01 Block Model | Transaction roots | transactions per block |
//! | sc-03 Block Template | Template build | mempool size |
//! | sc-04 Consensus | Aggregate verification | committee size |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::Rng;
use sc_01_block_model::{
    merkle_root_transactions, merkle_root_tx_hashes, OutputCoin, Transaction, Tx,
};
use sc_02_cross_shard::{CommitmentLedger, CrossShardRelay};
use sc_03_block_template::{
    BlockTemplateApi, BlockTemplateGenerator, MempoolMetadataValidator, NoTreasury,
    StructuralTxVerifier, TemplateConfig,
};
use sc_04_consensus::{Ed25519Scheme, InMemoryChain, SignatureScheme};
use shared_types::PublicKey;
use std::sync::Arc;
use std::time::Duration;

fn random_transactions(count: usize, shard_count: u8) -> Vec<Transaction> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|i| {
            // Route every sender to shard 0 so the whole set is selectable.
            let sender = PublicKey::from_bytes(vec![rng.gen(), (i as u8).wrapping_mul(shard_count)]);
            let receiver = PublicKey::from_bytes(vec![rng.gen(), rng.gen()]);
            Transaction::Normal(
                Tx::new(sender, rng.gen_range(1..=10), 0)
                    .with_outputs(vec![OutputCoin::new(receiver, rng.gen_range(1..=1_000))]),
            )
        })
        .collect()
}

// ============================================================================
// SC-01: Block Model
// ============================================================================

fn bench_transaction_roots(c: &mut Criterion) {
    let mut group = c.benchmark_group("sc-01-block-model");

    for size in [10, 100, 1_000] {
        let txs = random_transactions(size, 4);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("tx_root", size), &txs, |b, txs| {
            b.iter(|| black_box(merkle_root_tx_hashes(txs)))
        });
        group.bench_with_input(BenchmarkId::new("shard_tx_root", size), &txs, |b, txs| {
            b.iter(|| black_box(merkle_root_transactions(txs, 4)))
        });
    }

    group.finish();
}

// ============================================================================
// SC-03: Block Template
// ============================================================================

fn bench_template_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("sc-03-block-template");
    group.measurement_time(Duration::from_secs(10));

    let ledger = Arc::new(CommitmentLedger::new());
    let chain = Arc::new(InMemoryChain::new(4, ledger.clone()));
    let relay = Arc::new(CrossShardRelay::new(4, ledger));
    let generator = BlockTemplateGenerator::new(
        TemplateConfig::default(),
        chain,
        Arc::new(StructuralTxVerifier),
        Arc::new(MempoolMetadataValidator),
        Arc::new(NoTreasury),
        relay,
    );
    let producer = PublicKey::from_bytes(vec![0xEE, 0]);

    for size in [100, 1_000, 5_000] {
        let pending = random_transactions(size, 4);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("build_template", size), &pending, |b, pending| {
            b.iter(|| black_box(generator.build_template(pending, 0, &producer).is_ok()))
        });
    }

    group.finish();
}

// ============================================================================
// SC-04: Consensus
// ============================================================================

fn bench_aggregate_verification(c: &mut Criterion) {
    let mut group = c.benchmark_group("sc-04-consensus");
    let message = [7u8; 32];

    for size in [4, 16, 64] {
        let signers: Vec<Ed25519Scheme> = (0..size)
            .map(|i| Ed25519Scheme::from_seed([i as u8 + 1; 32]))
            .collect();
        let keys: Vec<PublicKey> = signers.iter().map(|s| s.public_key()).collect();
        let sigs: Vec<Vec<u8>> = signers.iter().map(|s| s.sign(&message)).collect();
        let aggregated = signers[0].aggregate(&sigs);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(
            BenchmarkId::new("verify_aggregate", size),
            &(keys, aggregated),
            |b, (keys, aggregated)| {
                b.iter(|| black_box(signers[0].verify_aggregate(keys, &message, aggregated)))
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_transaction_roots,
    bench_template_build,
    bench_aggregate_verification
);
criterion_main!(benches);
