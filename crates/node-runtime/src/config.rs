//! Node configuration.
//!
//! Defaults come from [`NodeConfig::default`]; every field can be
//! overridden through an `SC_*` environment variable.

use sc_04_consensus::{ConsensusConfig, NodeMode};
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// An override could not be parsed.
    #[error("invalid value for {var}: {value:?} ({reason})")]
    InvalidValue {
        /// Environment variable.
        var: &'static str,
        /// Raw value.
        value: String,
        /// Parser message.
        reason: String,
    },

    /// Parsed, but unusable.
    #[error("{0}")]
    Invalid(String),
}

/// Complete node configuration.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Devnet topology.
    pub devnet: DevnetConfig,
    /// Settings handed to every consensus engine.
    pub consensus: ConsensusConfig,
    /// Mempool transactions admitted per block.
    pub max_txs_in_block: usize,
    /// Default log filter, used when `RUST_LOG` is unset.
    pub log_level: String,
}

/// Devnet topology and traffic.
#[derive(Debug, Clone)]
pub struct DevnetConfig {
    /// Members of the beacon committee and of every shard committee.
    pub committee_size: usize,
    /// First byte of the key seeds; node `i` uses `seed_base + i`.
    pub seed_base: u8,
    /// Interval between synthetic transactions; `None` disables them.
    pub tx_interval: Option<Duration>,
    /// Interval between chain-height reports.
    pub report_interval: Duration,
}

impl Default for DevnetConfig {
    fn default() -> Self {
        Self {
            committee_size: 4,
            seed_base: 1,
            tx_interval: Some(Duration::from_millis(500)),
            report_interval: Duration::from_secs(10),
        }
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            devnet: DevnetConfig::default(),
            consensus: ConsensusConfig::default(),
            max_txs_in_block: sc_03_block_template::DEFAULT_MAX_TXS_IN_BLOCK,
            log_level: "info".to_string(),
        }
    }
}

impl NodeConfig {
    /// Number of distinct validator keys the devnet needs.
    pub fn node_count(&self) -> usize {
        self.devnet.committee_size * (usize::from(self.consensus.shard_count) + 1)
    }

    /// Reject configurations the devnet cannot run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.consensus.shard_count == 0 {
            return Err(ConfigError::Invalid("shard count must be at least 1".into()));
        }
        if self.devnet.committee_size == 0 {
            return Err(ConfigError::Invalid("committee size must be at least 1".into()));
        }
        let last_seed = usize::from(self.devnet.seed_base) + self.node_count();
        if last_seed > usize::from(u8::MAX) + 1 {
            return Err(ConfigError::Invalid(format!(
                "{} nodes do not fit in the seed range starting at {}",
                self.node_count(),
                self.devnet.seed_base
            )));
        }
        Ok(())
    }
}

/// Load configuration from the process environment.
pub fn load_config() -> Result<NodeConfig, ConfigError> {
    load_config_from(|var| std::env::var(var).ok())
}

/// Load configuration, reading overrides through `lookup`.
pub fn load_config_from<F>(lookup: F) -> Result<NodeConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = NodeConfig::default();

    if let Some(mode) = parse::<NodeMode, _>(&lookup, "SC_NODE_MODE")? {
        config.consensus.node_mode = mode;
    }
    if let Some(count) = parse(&lookup, "SC_SHARD_COUNT")? {
        config.consensus.shard_count = count;
    }
    if let Some(length) = parse(&lookup, "SC_EPOCH_LENGTH")? {
        config.consensus.epoch_length = length;
    }
    if let Some(ms) = parse(&lookup, "SC_ROUND_TIMEOUT_MS")? {
        config.consensus.timings.round_timeout = Duration::from_millis(ms);
    }
    if let Some(ms) = parse(&lookup, "SC_SETTLE_DELAY_MS")? {
        config.consensus.timings.settle_delay = Duration::from_millis(ms);
    }
    if let Some(ms) = parse(&lookup, "SC_IDLE_MS")? {
        config.consensus.timings.idle_after_no_role = Duration::from_millis(ms);
    }
    if let Some(size) = parse(&lookup, "SC_COMMITTEE_SIZE")? {
        config.devnet.committee_size = size;
    }
    if let Some(seed) = parse(&lookup, "SC_SEED_BASE")? {
        config.devnet.seed_base = seed;
    }
    if let Some(ms) = parse::<u64, _>(&lookup, "SC_TX_INTERVAL_MS")? {
        config.devnet.tx_interval = (ms > 0).then(|| Duration::from_millis(ms));
    }
    if let Some(secs) = parse(&lookup, "SC_REPORT_SECS")? {
        config.devnet.report_interval = Duration::from_secs(secs);
    }
    if let Some(max) = parse(&lookup, "SC_MAX_TXS_IN_BLOCK")? {
        config.max_txs_in_block = max;
    }
    if let Some(level) = lookup("SC_LOG") {
        config.log_level = level;
    }

    config.validate()?;
    Ok(config)
}

fn parse<T, F>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = lookup(var) else {
        return Ok(None);
    };
    value
        .trim()
        .parse()
        .map(Some)
        .map_err(|e: T::Err| ConfigError::InvalidValue {
            var,
            reason: e.to_string(),
            value,
        })
}
