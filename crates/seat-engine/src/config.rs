//! Engine configuration: the timezone every local time is read in, the slot length,
//! and the DST gap policy.

use chrono_tz::Tz;
use serde::Deserialize;

use crate::dst::DstPolicy;
use crate::error::{EngineError, Result};

pub const DEFAULT_TIMEZONE: &str = "Asia/Seoul";
pub const DEFAULT_SLOT_MINUTES: i64 = 30;

/// Configuration threaded explicitly into the resolver and the grid generator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub timezone: Tz,
    /// Length of one time-wise frame. Divides 60.
    pub slot_minutes: i64,
    pub dst_policy: DstPolicy,
}

/// On-disk shape; every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    timezone: Option<String>,
    slot_minutes: Option<i64>,
    dst_policy: Option<DstPolicy>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timezone: chrono_tz::Asia::Seoul,
            slot_minutes: DEFAULT_SLOT_MINUTES,
            dst_policy: DstPolicy::default(),
        }
    }
}

impl EngineConfig {
    /// Default configuration in the given IANA timezone.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidTimezone` if `timezone` is not a valid IANA identifier.
    pub fn new(timezone: &str) -> Result<Self> {
        Ok(Self {
            timezone: parse_timezone(timezone)?,
            ..Self::default()
        })
    }

    /// Parse a JSON config document such as
    /// `{"timezone": "Asia/Seoul", "slot_minutes": 30, "dst_policy": "skip"}`.
    pub fn from_json(json: &str) -> Result<Self> {
        let file: ConfigFile =
            serde_json::from_str(json).map_err(|e| EngineError::InvalidConfig(e.to_string()))?;

        let mut config = Self::default();
        if let Some(tz) = file.timezone {
            config.timezone = parse_timezone(&tz)?;
        }
        if let Some(minutes) = file.slot_minutes {
            config = config.with_slot_minutes(minutes)?;
        }
        if let Some(policy) = file.dst_policy {
            config.dst_policy = policy;
        }
        Ok(config)
    }

    /// Override the slot length.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidConfig` unless `minutes` is positive and divides 60.
    pub fn with_slot_minutes(mut self, minutes: i64) -> Result<Self> {
        if minutes <= 0 || 60 % minutes != 0 {
            return Err(EngineError::InvalidConfig(format!(
                "slot_minutes must be a positive divisor of 60, got {}",
                minutes
            )));
        }
        self.slot_minutes = minutes;
        Ok(self)
    }

    pub fn with_timezone(mut self, timezone: &str) -> Result<Self> {
        self.timezone = parse_timezone(timezone)?;
        Ok(self)
    }
}

fn parse_timezone(timezone: &str) -> Result<Tz> {
    timezone
        .parse()
        .map_err(|_| EngineError::InvalidTimezone(timezone.to_string()))
}
