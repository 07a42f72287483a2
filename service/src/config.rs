//! Service configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use coffer_types::{Amount, HolderAddress};

use crate::error::ServiceError;
use crate::gate::{Capability, RoleTable};

/// A reserve balance seeded at genesis.
///
/// The amount travels as a decimal string: TOML integers are signed 64-bit
/// and cannot carry a full `u128`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenesisReserve {
    pub address: String,
    pub amount: String,
}

/// Configuration for a coffer service.
///
/// Can be loaded from a TOML file via [`ServiceConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Data directory for ledger storage.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// RPC port.
    #[serde(default = "default_rpc_port")]
    pub rpc_port: u16,

    /// LMDB map size in bytes.
    #[serde(default = "default_map_size")]
    pub map_size: usize,

    /// Initial global accrual rate, raw units per second against the rate
    /// scale. Only meaningful on first start; a populated store wins.
    #[serde(default)]
    pub initial_rate: u64,

    /// Address of the reserve vault.
    #[serde(default = "default_vault_address")]
    pub vault_address: String,

    /// Owner principal; holds every capability. Absent means no owner.
    #[serde(default)]
    pub owner: Option<String>,

    /// Principals granted mint-and-burn.
    #[serde(default)]
    pub minters: Vec<String>,

    /// Principals granted rate management.
    #[serde(default)]
    pub rate_managers: Vec<String>,

    /// Reserve balances seeded on first start.
    #[serde(default)]
    pub genesis_reserves: Vec<GenesisReserve>,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_data_dir() -> PathBuf {
    PathBuf::from("./coffer_data")
}

fn default_rpc_port() -> u16 {
    7070
}

fn default_map_size() -> usize {
    1024 * 1024 * 1024
}

fn default_vault_address() -> String {
    "cfr_vault".to_string()
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl ServiceConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, ServiceError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ServiceError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ServiceError> {
        toml::from_str(s).map_err(|e| ServiceError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).expect("ServiceConfig is always serializable to TOML")
    }

    /// The vault address, validated.
    pub fn vault(&self) -> Result<HolderAddress, ServiceError> {
        Ok(HolderAddress::parse(&self.vault_address)?)
    }

    /// Build the capability role table from the configured principals.
    pub fn role_table(&self) -> Result<RoleTable, ServiceError> {
        let mut table = match &self.owner {
            Some(owner) => RoleTable::with_owner(HolderAddress::parse(owner)?),
            None => RoleTable::new(),
        };
        for minter in &self.minters {
            table.grant(HolderAddress::parse(minter)?, Capability::MintAndBurn);
        }
        for manager in &self.rate_managers {
            table.grant(HolderAddress::parse(manager)?, Capability::ManageRate);
        }
        Ok(table)
    }

    /// Parse the genesis reserve seeds into typed balances.
    pub fn genesis_balances(&self) -> Result<Vec<(HolderAddress, Amount)>, ServiceError> {
        let mut balances = Vec::with_capacity(self.genesis_reserves.len());
        for seed in &self.genesis_reserves {
            let address = HolderAddress::parse(&seed.address)?;
            let amount = Amount::from_str(&seed.amount).map_err(|e| {
                ServiceError::Config(format!(
                    "genesis reserve amount {:?} for {}: {e}",
                    seed.amount, seed.address
                ))
            })?;
            balances.push((address, amount));
        }
        Ok(balances)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            rpc_port: default_rpc_port(),
            map_size: default_map_size(),
            initial_rate: 0,
            vault_address: default_vault_address(),
            owner: None,
            minters: Vec::new(),
            rate_managers: Vec::new(),
            genesis_reserves: Vec::new(),
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::CapabilityGate;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = ServiceConfig::default();
        let toml_str = config.to_toml_string();
        let parsed = ServiceConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed.rpc_port, config.rpc_port);
        assert_eq!(parsed.vault_address, config.vault_address);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = ServiceConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.rpc_port, 7070);
        assert_eq!(config.vault_address, "cfr_vault");
        assert_eq!(config.log_format, "human");
        assert_eq!(config.initial_rate, 0);
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            rpc_port = 9999
            initial_rate = 12345
        "#;
        let config = ServiceConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.rpc_port, 9999);
        assert_eq!(config.initial_rate, 12345);
        assert_eq!(config.log_format, "human"); // default
    }

    #[test]
    fn missing_file_returns_config_error() {
        let result = ServiceConfig::from_toml_file(Path::new("/nonexistent/coffer.toml"));
        assert!(matches!(result, Err(ServiceError::Config(_))));
    }

    #[test]
    fn genesis_reserves_parse_into_typed_balances() {
        let toml = r#"
            [[genesis_reserves]]
            address = "cfr_alice"
            amount = "340282366920938463463374607431768211454"

            [[genesis_reserves]]
            address = "cfr_bob"
            amount = "500"
        "#;
        let config = ServiceConfig::from_toml_str(toml).expect("should parse");
        let balances = config.genesis_balances().expect("should convert");
        assert_eq!(balances.len(), 2);
        assert_eq!(balances[0].0.as_str(), "cfr_alice");
        assert_eq!(
            balances[0].1,
            Amount::new(340282366920938463463374607431768211454)
        );
        assert_eq!(balances[1].1, Amount::new(500));
    }

    #[test]
    fn bad_genesis_amount_is_a_config_error() {
        let toml = r#"
            [[genesis_reserves]]
            address = "cfr_alice"
            amount = "not-a-number"
        "#;
        let config = ServiceConfig::from_toml_str(toml).expect("should parse");
        assert!(matches!(
            config.genesis_balances(),
            Err(ServiceError::Config(_))
        ));
    }

    #[test]
    fn role_table_reflects_owner_and_grants() {
        let toml = r#"
            owner = "cfr_admin"
            minters = ["cfr_bridge"]
            rate_managers = ["cfr_treasury"]
        "#;
        let config = ServiceConfig::from_toml_str(toml).expect("should parse");
        let table = config.role_table().expect("should build");

        let admin = HolderAddress::new("cfr_admin");
        let bridge = HolderAddress::new("cfr_bridge");
        let treasury = HolderAddress::new("cfr_treasury");
        assert!(table.allows(&admin, Capability::MintAndBurn));
        assert!(table.allows(&admin, Capability::ManageRate));
        assert!(table.allows(&bridge, Capability::MintAndBurn));
        assert!(!table.allows(&bridge, Capability::ManageRate));
        assert!(table.allows(&treasury, Capability::ManageRate));
        assert!(!table.allows(&treasury, Capability::MintAndBurn));
    }

    #[test]
    fn invalid_vault_address_is_rejected() {
        let toml = r#"vault_address = "vault-without-prefix""#;
        let config = ServiceConfig::from_toml_str(toml).expect("should parse");
        assert!(matches!(config.vault(), Err(ServiceError::Address(_))));
    }
}
