//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::{Address, EscrowSwapError, Result, constants};

/// Deployment parameters of a settlement engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Identity under which escrow addresses are derived.
    pub program_id: Address,
    /// Identity under which resolver capability addresses are derived.
    pub registry_program_id: Address,
    /// Lamports the maker deposits to back each escrow record.
    pub escrow_rent_lamports: u64,
    /// Maximum number of Dutch-auction decay points per order.
    pub max_auction_points: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            program_id: Address(constants::DEFAULT_PROGRAM_ID),
            registry_program_id: Address(constants::DEFAULT_REGISTRY_PROGRAM_ID),
            escrow_rent_lamports: constants::DEFAULT_ESCROW_RENT_LAMPORTS,
            max_auction_points: constants::DEFAULT_MAX_AUCTION_POINTS,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON config. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| EscrowSwapError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.program_id == Address::default() {
            return Err(EscrowSwapError::Configuration(
                "program_id must not be all zeros".to_string(),
            ));
        }
        if self.registry_program_id == self.program_id {
            return Err(EscrowSwapError::Configuration(
                "registry_program_id must differ from program_id".to_string(),
            ));
        }
        if self.escrow_rent_lamports == 0 {
            return Err(EscrowSwapError::Configuration(
                "escrow_rent_lamports must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = EngineConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.escrow_rent_lamports, 2_039_280);
        assert_eq!(cfg.max_auction_points, 8);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg = EngineConfig::from_json(r#"{"max_auction_points": 3}"#).unwrap();
        assert_eq!(cfg.max_auction_points, 3);
        assert_eq!(cfg.program_id, EngineConfig::default().program_id);
    }

    #[test]
    fn zero_program_id_rejected() {
        let json = format!(r#"{{"program_id": "{}"}}"#, "00".repeat(32));
        let err = EngineConfig::from_json(&json).unwrap_err();
        assert!(matches!(err, EscrowSwapError::Configuration(_)));
    }

    #[test]
    fn malformed_json_is_configuration_error() {
        let err = EngineConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, EscrowSwapError::Configuration(_)));
    }

    #[test]
    fn serde_roundtrip() {
        let cfg = EngineConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back = EngineConfig::from_json(&json).unwrap();
        assert_eq!(cfg, back);
    }
}
