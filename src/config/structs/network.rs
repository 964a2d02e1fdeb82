//! Network and HTTP configuration structures.

use serde::{Deserialize, Serialize};

use crate::error::{ForgeError, Result};

/// Network configuration.
///
/// Controls timeouts and stream decode tolerance. Generation calls are
/// never retried.
///
/// # Fields
/// - `connect_timeout`: TCP/TLS connect timeout in seconds (default: `10`)
/// - `first_byte_timeout`: wait for response headers and for the first body chunk, in seconds (default: `60`)
/// - `stream_timeout`: upper bound for a whole generation call, in seconds (default: `600`)
/// - `max_consecutive_decode_errors`: consecutive undecodable stream records
///   tolerated before the call fails (default: `8`, `0` disables the limit)
///
/// # Example
/// ```toml
/// [network]
/// connect_timeout = 10
/// first_byte_timeout = 60
/// stream_timeout = 600
/// max_consecutive_decode_errors = 8
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NetworkConfig {
    /// HTTP connect timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,

    /// Time to first byte in seconds.
    #[serde(default = "default_first_byte_timeout")]
    pub first_byte_timeout: u64,

    /// Whole-call timeout in seconds.
    #[serde(default = "default_stream_timeout")]
    pub stream_timeout: u64,

    /// Consecutive malformed stream records tolerated.
    #[serde(default = "default_max_consecutive_decode_errors")]
    pub max_consecutive_decode_errors: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            connect_timeout: default_connect_timeout(),
            first_byte_timeout: default_first_byte_timeout(),
            stream_timeout: default_stream_timeout(),
            max_consecutive_decode_errors: default_max_consecutive_decode_errors(),
        }
    }
}

impl NetworkConfig {
    /// Validates network configuration.
    pub fn validate(&self) -> Result<()> {
        if self.connect_timeout == 0 {
            return Err(ForgeError::Config(
                "network.connect_timeout cannot be 0".into(),
            ));
        }
        if self.first_byte_timeout == 0 {
            return Err(ForgeError::Config(
                "network.first_byte_timeout cannot be 0".into(),
            ));
        }
        if self.stream_timeout < self.first_byte_timeout {
            return Err(ForgeError::Config(format!(
                "network.stream_timeout ({}) must not be shorter than network.first_byte_timeout ({})",
                self.stream_timeout, self.first_byte_timeout
            )));
        }
        Ok(())
    }
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_first_byte_timeout() -> u64 {
    60
}

fn default_stream_timeout() -> u64 {
    600 // 10 minutes
}

fn default_max_consecutive_decode_errors() -> usize {
    8
}
