//! Assembler configuration
//!
//! Options can be built in code or loaded from TOML or JSON:
//!
//! ```toml
//! compression = "zstd"
//! compression_level = 9
//! timestamp = 1714694400
//! ```

use crate::container::CompressionMethod;
use crate::error::Result;
use crate::timestamp::Timestamp;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArchiveOptions {
    /// Compression applied to every container entry
    pub compression: CompressionMethod,

    /// Method-specific level; the writer default when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compression_level: Option<i32>,

    /// Unix seconds recorded as entry time and table date; now when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
}

impl ArchiveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_compression(mut self, compression: CompressionMethod) -> Self {
        self.compression = compression;
        self
    }

    pub fn with_compression_level(mut self, level: i32) -> Self {
        self.compression_level = Some(level);
        self
    }

    pub fn with_timestamp(mut self, unix_secs: u64) -> Self {
        self.timestamp = Some(unix_secs);
        self
    }

    /// Resolve the configured timestamp, falling back to the current time
    pub fn resolve_timestamp(&self) -> Timestamp {
        self.timestamp
            .map(Timestamp::from_unix)
            .unwrap_or_else(Timestamp::now)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }

    pub fn from_json(data: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(data)?)
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }
}
