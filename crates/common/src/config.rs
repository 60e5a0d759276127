use serde::{Deserialize, Serialize};

/// Broadcast-optimization toggle and byte threshold for two-input joins.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BroadcastConfig {
    /// Whether the broadcast optimization may fire at all.
    #[serde(default = "default_broadcast_enabled")]
    pub enabled: bool,
    /// Byte threshold under which one join side is considered broadcastable.
    #[serde(default = "default_broadcast_threshold_bytes")]
    pub threshold_bytes: u64,
}

fn default_broadcast_enabled() -> bool {
    true
}

fn default_broadcast_threshold_bytes() -> u64 {
    64 * 1024 * 1024 // 64MB
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            enabled: default_broadcast_enabled(),
            threshold_bytes: default_broadcast_threshold_bytes(),
        }
    }
}

/// Per-operator coordinator construction parameters.
///
/// One value is built per downstream operator instance during physical-plan
/// compilation and handed to the coordinator explicitly; there is no global
/// configuration registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Number of sibling exchanges expected to register; asserted at estimation.
    pub num_exchanges: u32,
    /// Advisory post-shuffle partition byte budget.
    #[serde(default = "default_target_bytes")]
    pub target_bytes: u64,
    /// Optional floor on the post-shuffle partition count.
    #[serde(default)]
    pub min_partitions: Option<u32>,
    /// Whether the downstream operator is a two-input join (broadcast eligibility).
    #[serde(default)]
    pub two_input_join: bool,
    /// Broadcast-optimization settings.
    #[serde(default)]
    pub broadcast: BroadcastConfig,
}

fn default_target_bytes() -> u64 {
    64 * 1024 * 1024 // 64MB
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            num_exchanges: 1,
            target_bytes: default_target_bytes(),
            min_partitions: None,
            two_input_join: false,
            broadcast: BroadcastConfig::default(),
        }
    }
}

impl CoordinatorConfig {
    /// Convenience constructor for the common single-input case.
    pub fn single_exchange(target_bytes: u64) -> Self {
        Self {
            num_exchanges: 1,
            target_bytes,
            ..Self::default()
        }
    }

    /// Convenience constructor for two-input join operators.
    pub fn for_join(target_bytes: u64, broadcast: BroadcastConfig) -> Self {
        Self {
            num_exchanges: 2,
            target_bytes,
            two_input_join: true,
            broadcast,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let cfg: CoordinatorConfig = serde_json::from_str(r#"{"num_exchanges": 2}"#).expect("cfg");
        assert_eq!(cfg.num_exchanges, 2);
        assert_eq!(cfg.target_bytes, 64 * 1024 * 1024);
        assert_eq!(cfg.min_partitions, None);
        assert!(!cfg.two_input_join);
        assert!(cfg.broadcast.enabled);
    }
}
