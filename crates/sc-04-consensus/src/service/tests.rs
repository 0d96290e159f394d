use super::*;
use crate::adapters::{Ed25519Scheme, LoopbackNetwork};
use crate::ports::{ChainState, RecordingNetwork, RecordingStatus, SignatureScheme};
use crate::test_support::{fixture, keys, ports, signer, Fixture};
use sc_01_block_model::{Transaction, Tx};
use sc_03_block_template::TemplateChainReader;
use std::time::Duration;

fn engine_with(
    fx: &Fixture,
    me: Arc<Ed25519Scheme>,
    config: ConsensusConfig,
) -> (Arc<ConsensusEngine>, Arc<RecordingStatus>) {
    let status = Arc::new(RecordingStatus::new());
    let ports = ports(
        fx,
        me,
        Arc::new(RecordingNetwork::new()),
        fx.chain.clone(),
        status.clone(),
    );
    (Arc::new(ConsensusEngine::new(config, ports)), status)
}

fn config(mode: NodeMode) -> ConsensusConfig {
    ConsensusConfig {
        node_mode: mode,
        ..ConsensusConfig::for_testing()
    }
}

#[tokio::test(start_paused = true)]
async fn test_start_twice_fails() {
    let fx = fixture();
    let (engine, _) = engine_with(&fx, signer(1), config(NodeMode::Auto));

    engine.start().unwrap();
    assert!(engine.is_running());
    assert!(matches!(engine.start(), Err(ConsensusError::AlreadyStarted)));
    engine.stop().await.unwrap();
    assert!(!engine.is_running());
}

#[tokio::test(start_paused = true)]
async fn test_stop_when_stopped_fails() {
    let fx = fixture();
    let (engine, _) = engine_with(&fx, signer(1), config(NodeMode::Auto));

    assert!(matches!(
        engine.stop().await,
        Err(ConsensusError::AlreadyStopped)
    ));
    engine.start().unwrap();
    engine.stop().await.unwrap();
    assert!(matches!(
        engine.stop().await,
        Err(ConsensusError::AlreadyStopped)
    ));
}

#[tokio::test(start_paused = true)]
async fn test_engine_restarts_after_stop() {
    let fx = fixture();
    let (engine, _) = engine_with(&fx, signer(1), config(NodeMode::Auto));
    engine.start().unwrap();
    engine.stop().await.unwrap();
    engine.start().unwrap();
    engine.stop().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_deliver_requires_running_engine() {
    let fx = fixture();
    let me = signer(1);
    let (engine, _) = engine_with(&fx, me.clone(), config(NodeMode::Auto));
    let msg = BftMessage::Vote {
        chain: Chain::Beacon,
        height: 1,
        block_hash: [0u8; 32],
        voter_idx: 0,
        voter: me.public_key(),
        sig: vec![],
    };

    assert!(matches!(
        engine.deliver(msg.clone()),
        Err(ConsensusError::NotRunning)
    ));
    engine.start().unwrap();
    engine.deliver(msg).unwrap();
    engine.stop().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_full_mailbox_refuses_delivery() {
    let fx = fixture();
    fx.chain.set_ready(false);
    let me = signer(1);
    let (engine, _) = engine_with(
        &fx,
        me.clone(),
        ConsensusConfig {
            mailbox_capacity: 1,
            ..config(NodeMode::Auto)
        },
    );
    let msg = BftMessage::Vote {
        chain: Chain::Beacon,
        height: 1,
        block_hash: [0u8; 32],
        voter_idx: 0,
        voter: me.public_key(),
        sig: vec![],
    };

    engine.start().unwrap();
    engine.deliver(msg.clone()).unwrap();
    assert!(matches!(
        engine.deliver(msg),
        Err(ConsensusError::MailboxFull)
    ));
    engine.stop().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_idles_until_chain_ready() {
    let fx = fixture();
    fx.chain.set_ready(false);
    let (engine, status) = engine_with(&fx, signer(1), config(NodeMode::Auto));

    engine.start().unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(status.published().is_empty());

    fx.chain.set_ready(true);
    tokio::time::sleep(Duration::from_millis(200)).await;
    let published = status.published();
    assert!(!published.is_empty());
    assert_eq!(published[0].role, Role::None);
    assert_eq!(engine.current_role(), AssignedRole::none());

    engine.stop().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_single_validator_shard_produces_blocks() {
    let fx = fixture();
    let me = signer(1);
    fx.chain
        .set_committee(Chain::Shard(0), vec![me.public_key()]);
    let tx = Transaction::Normal(Tx::new(
        shared_types::PublicKey::from_bytes(vec![7, 4]),
        3,
        0,
    ));
    fx.chain.submit_transaction(tx.clone());

    let (engine, status) = engine_with(&fx, me.clone(), config(NodeMode::Shard));
    engine.start().unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;
    engine.stop().await.unwrap();

    assert!(fx.chain.height(Chain::Shard(0)) >= 3);
    assert_eq!(fx.chain.mempool_len(), 0);
    assert_eq!(fx.chain.transaction_by_hash(&tx.hash()), Some(tx));

    let last = status.published().pop().unwrap();
    assert_eq!(last.role, Role::ShardProposer);
    assert_eq!(last.public_key_b58, me.public_key().to_base58());
    assert_eq!(last.shard_committee, vec![me.public_key().to_base58()]);

    // Each block carries the previous block's proof.
    let best = fx.chain.best_block(Chain::Shard(0)).unwrap();
    assert_eq!(best.proof().validators_idx, vec![0]);
    assert_eq!(best.parent_proof().validators_idx, vec![0]);
}

#[tokio::test(start_paused = true)]
async fn test_beacon_mode_ignores_shard_membership() {
    let fx = fixture();
    let me = signer(1);
    fx.chain
        .set_committee(Chain::Shard(2), vec![me.public_key()]);

    let (engine, status) = engine_with(&fx, me, config(NodeMode::Beacon));
    engine.start().unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;
    engine.stop().await.unwrap();

    assert!(status.published().iter().all(|s| s.role == Role::None));
    assert_eq!(fx.chain.height(Chain::Shard(2)), 0);
}

#[tokio::test(start_paused = true)]
async fn test_auto_mode_prefers_beacon() {
    let fx = fixture();
    let me = signer(1);
    fx.chain.set_committee(Chain::Beacon, vec![me.public_key()]);
    fx.chain
        .set_committee(Chain::Shard(1), vec![me.public_key()]);

    let (engine, _) = engine_with(&fx, me, config(NodeMode::Auto));
    engine.start().unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;

    let assigned = engine.current_role();
    assert_eq!(assigned.role, Role::BeaconProposer);
    assert_eq!(assigned.chain, Some(Chain::Beacon));
    engine.stop().await.unwrap();

    assert!(fx.chain.height(Chain::Beacon) >= 1);
    assert_eq!(fx.chain.height(Chain::Shard(1)), 0);
}

#[tokio::test(start_paused = true)]
async fn test_four_validators_finalize_over_loopback() {
    let fx = fixture();
    let members = vec![signer(21), signer(22), signer(23), signer(24)];
    fx.chain.set_committee(Chain::Shard(0), keys(&members));

    let hub = LoopbackNetwork::new();
    let mut engines = Vec::new();
    for member in &members {
        let node_ports = ports(
            &fx,
            member.clone(),
            Arc::new(hub.endpoint(member.public_key())),
            fx.chain.clone(),
            Arc::new(RecordingStatus::new()),
        );
        let engine = Arc::new(ConsensusEngine::new(config(NodeMode::Shard), node_ports));
        hub.register(member.public_key(), &engine);
        engines.push(engine);
    }

    for engine in &engines {
        engine.start().unwrap();
    }
    tokio::time::sleep(Duration::from_secs(2)).await;
    for engine in &engines {
        assert_eq!(engine.current_role().chain, Some(Chain::Shard(0)));
        engine.stop().await.unwrap();
    }

    let height = fx.chain.height(Chain::Shard(0));
    assert!(height >= 4, "only reached height {}", height);

    let best = fx.chain.best_block(Chain::Shard(0)).unwrap();
    let committee = CommitteeSet::new(keys(&members)).unwrap();
    assert_eq!(best.producer(), committee.proposer_at(height));
    assert!(best.proof().validators_idx.len() >= 3);
    assert!(crate::round::verify_finality(
        &committee,
        3,
        members[0].as_ref(),
        &best,
        best.proof()
    ));
}

#[test]
fn test_template_reader_view_is_the_chain() {
    let fx = fixture();
    let reader = fx.chain.as_template_reader();
    assert!(reader.best_shard_header(0).is_some());
}
