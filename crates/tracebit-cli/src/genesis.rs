//! # Genesis Configuration
//!
//! The YAML document describing initial contract state. Either section may
//! be omitted; a script that touches a missing contract fails.
//!
//! ```yaml
//! cases:
//!   admin: admin.test
//!   reporters: [reporter.test]
//!   reviewers: [reviewer.test]
//! registry:
//!   admin: ST1ADMIN
//!   block_height: 100
//!   sentinel_address: SP000000000000000000002Q6VF78   # optional
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use tracebit_core::{BlockHeight, Principal};
use tracebit_state::{CaseStore, EntityRegistry, RegistryConfig, Roster};

/// Initial state for the case workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseGenesis {
    /// Initial admin.
    pub admin: Principal,
    /// Identities allowed to submit cases.
    #[serde(default)]
    pub reporters: Vec<Principal>,
    /// Identities allowed to review and finalize cases.
    #[serde(default)]
    pub reviewers: Vec<Principal>,
}

impl CaseGenesis {
    /// Build a fresh store.
    pub fn build(&self) -> CaseStore {
        let roster = self
            .reporters
            .iter()
            .cloned()
            .fold(Roster::new(self.admin.clone()), Roster::with_reporter);
        let roster = self
            .reviewers
            .iter()
            .cloned()
            .fold(roster, Roster::with_reviewer);
        CaseStore::new(roster)
    }
}

/// Initial state for the entity registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryGenesis {
    /// Initial admin.
    pub admin: Principal,
    /// Starting block height.
    #[serde(default)]
    pub block_height: BlockHeight,
    /// Address rejected as wallet key or admin target.
    #[serde(default = "Principal::burn_address")]
    pub sentinel_address: Principal,
}

impl RegistryGenesis {
    /// Build a fresh registry.
    pub fn build(&self) -> EntityRegistry {
        let config = RegistryConfig {
            sentinel_address: self.sentinel_address.clone(),
        };
        EntityRegistry::new(self.admin.clone(), config).with_block_height(self.block_height)
    }
}

/// A complete genesis document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Genesis {
    /// Case workflow section.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cases: Option<CaseGenesis>,
    /// Entity registry section.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry: Option<RegistryGenesis>,
}

impl Genesis {
    /// Parse a genesis document from YAML.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("failed to parse genesis YAML")
    }

    /// Read and parse a genesis file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read genesis file: {}", path.display()))?;
        Self::from_yaml_str(&content).with_context(|| format!("invalid genesis: {}", path.display()))
    }

    /// Validate the document. Returns a list of problems (empty = valid).
    ///
    /// Empty reporter or reviewer sets are valid: the admin can grant
    /// roles once the contract is live.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.cases.is_none() && self.registry.is_none() {
            errors.push("genesis defines neither `cases` nor `registry`".to_string());
        }
        if let Some(registry) = &self.registry {
            if registry.admin == registry.sentinel_address {
                errors.push(format!(
                    "registry admin must not be the sentinel address {}",
                    registry.sentinel_address
                ));
            }
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
cases:
  admin: admin.test
  reporters: [reporter.test]
  reviewers: [reviewer.test]
registry:
  admin: ST1ADMIN
  block_height: 100
"#;

    #[test]
    fn parses_full_genesis() {
        let g = Genesis::from_yaml_str(FULL).unwrap();
        assert!(g.validate().is_empty());

        let store = g.cases.as_ref().unwrap().build();
        assert!(store.is_reporter(&Principal::new("reporter.test").unwrap()));
        assert!(store.is_reviewer(&Principal::new("reviewer.test").unwrap()));
        assert_eq!(store.admin().as_str(), "admin.test");

        let reg = g.registry.as_ref().unwrap().build();
        assert_eq!(reg.block_height(), BlockHeight::new(100));
        assert_eq!(reg.sentinel_address(), &Principal::burn_address());
    }

    #[test]
    fn sentinel_override() {
        let g = Genesis::from_yaml_str(
            "registry:\n  admin: ST1ADMIN\n  sentinel_address: ST000BURN\n",
        )
        .unwrap();
        let reg = g.registry.unwrap().build();
        assert_eq!(reg.sentinel_address().as_str(), "ST000BURN");
        assert_eq!(reg.block_height(), BlockHeight::GENESIS);
    }

    #[test]
    fn empty_genesis_is_invalid() {
        let g = Genesis::from_yaml_str("{}").unwrap();
        assert_eq!(g.validate().len(), 1);
    }

    #[test]
    fn sentinel_admin_is_invalid() {
        let g = Genesis::from_yaml_str(
            "registry:\n  admin: SP000000000000000000002Q6VF78\n",
        )
        .unwrap();
        let errors = g.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("sentinel"));
    }

    #[test]
    fn admin_only_case_genesis_is_valid() {
        let g = Genesis::from_yaml_str("cases:\n  admin: admin.test\n").unwrap();
        assert!(g.validate().is_empty());

        let store = g.cases.unwrap().build();
        assert_eq!(store.roster().members(tracebit_state::Role::Reporter).count(), 0);
    }

    #[test]
    fn empty_admin_fails_to_parse() {
        assert!(Genesis::from_yaml_str("cases:\n  admin: \"\"\n").is_err());
    }

    #[test]
    fn unknown_section_fails_to_parse() {
        assert!(Genesis::from_yaml_str("ledger:\n  admin: x\n").is_err());
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("genesis.yaml");
        std::fs::write(&path, FULL).unwrap();
        let g = Genesis::load(&path).unwrap();
        assert!(g.cases.is_some());
    }

    #[test]
    fn load_missing_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = Genesis::load(&dir.path().join("absent.yaml")).unwrap_err();
        assert!(err.to_string().contains("absent.yaml"));
    }
}
