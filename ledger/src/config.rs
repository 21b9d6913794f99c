//! Ledger policy configuration.

use ballot_types::Address;
use serde::{Deserialize, Serialize};

/// Policy knobs for a ledger instance, loadable from the `[ledger]` TOML table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Identities allowed to start and close proposals.
    #[serde(default)]
    pub operators: Vec<Address>,

    /// Whether an active proposal still accepts votes once its end date has
    /// passed but nobody has closed it yet.
    #[serde(default)]
    pub accept_votes_after_end: bool,
}

impl LedgerConfig {
    /// A config with a single operator and the default vote policy.
    pub fn with_operator(operator: Address) -> Self {
        Self {
            operators: vec![operator],
            ..Self::default()
        }
    }

    pub fn is_operator(&self, who: &Address) -> bool {
        self.operators.iter().any(|op| op == who)
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            operators: Vec::new(),
            accept_votes_after_end: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_uses_defaults() {
        let config: LedgerConfig = toml::from_str("").unwrap();
        assert!(config.operators.is_empty());
        assert!(!config.accept_votes_after_end);
    }

    #[test]
    fn operators_parse_case_insensitively() {
        let toml = r#"
            operators = ["0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA"]
            accept_votes_after_end = true
        "#;
        let config: LedgerConfig = toml::from_str(toml).unwrap();
        assert!(config.is_operator(&Address::from_seed(0xaa)));
        assert!(config.accept_votes_after_end);
    }

    #[test]
    fn malformed_operator_is_rejected() {
        let result: Result<LedgerConfig, _> = toml::from_str(r#"operators = ["admin"]"#);
        assert!(result.is_err());
    }
}
