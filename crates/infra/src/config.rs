//! Configuration loading and representation.
//!
//! Everything comes from `CARWORKS_*` environment variables. Business rules
//! may also come from a JSON rules file; individual variables override it.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use carworks_core::AggregateId;
use carworks_factory::FactoryRules;
use carworks_observability::LogFormat;

use crate::journal_store::{
    InMemoryJournalStore, JournalStore, JournalStoreError, JsonLinesJournalStore,
};

pub const JOURNAL_PATH: &str = "CARWORKS_JOURNAL_PATH";
pub const FACTORY_ID: &str = "CARWORKS_FACTORY_ID";
pub const RULES_FILE: &str = "CARWORKS_RULES_FILE";
pub const CARGO_BAY_CAPACITY: &str = "CARWORKS_CARGO_BAY_CAPACITY";
pub const REMARK_THRESHOLD: &str = "CARWORKS_REMARK_THRESHOLD";
pub const BLACKLIST: &str = "CARWORKS_BLACKLIST";
pub const LOG_FORMAT: &str = "CARWORKS_LOG_FORMAT";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}' ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("cannot read rules file {path}: {source}")]
    RulesFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse rules file {path}: {reason}")]
    RulesParse { path: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// JSON-lines journal file. `None` keeps the journal in memory.
    pub journal_path: Option<PathBuf>,
    /// Identity of the factory whose journal is opened.
    pub factory_id: AggregateId,
    pub rules: FactoryRules,
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            journal_path: None,
            factory_id: default_factory_id(),
            rules: FactoryRules::default(),
            log_format: LogFormat::default(),
        }
    }
}

/// The factory every process opens unless told otherwise.
pub fn default_factory_id() -> AggregateId {
    AggregateId::from_uuid(Uuid::nil())
}

impl AppConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through `lookup`. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = AppConfig::default();

        config.journal_path = get(JOURNAL_PATH).map(PathBuf::from);

        if let Some(raw) = get(FACTORY_ID) {
            config.factory_id = parse(FACTORY_ID, &raw)?;
        }

        if let Some(path) = get(RULES_FILE) {
            config.rules = read_rules_file(&path)?;
        }
        if let Some(raw) = get(CARGO_BAY_CAPACITY) {
            config.rules.cargo_bay_capacity = parse(CARGO_BAY_CAPACITY, &raw)?;
        }
        if let Some(raw) = get(REMARK_THRESHOLD) {
            config.rules.remark_threshold = parse(REMARK_THRESHOLD, &raw)?;
        }
        if let Some(raw) = get(BLACKLIST) {
            config.rules.blacklisted_names = raw
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect();
        }

        if let Some(raw) = get(LOG_FORMAT) {
            config.log_format = parse(LOG_FORMAT, &raw)?;
        }

        Ok(config)
    }

    /// Open the configured journal store.
    pub fn open_store(&self) -> Result<Arc<dyn JournalStore>, JournalStoreError> {
        Ok(match &self.journal_path {
            Some(path) => Arc::new(JsonLinesJournalStore::open(path.clone())?),
            None => Arc::new(InMemoryJournalStore::new()),
        })
    }
}

fn parse<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

fn read_rules_file(path: &str) -> Result<FactoryRules, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::RulesFile {
        path: path.to_string(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|e| ConfigError::RulesParse {
        path: path.to_string(),
        reason: e.to_string(),
    })
}
