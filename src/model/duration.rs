//! # Dual-representation Durations
//!
//! TTL-like attributes are accepted as plain seconds (`"3600"`) or as a
//! suffixed duration (`"8760h"`), while the remote always answers with the
//! canonical integer seconds. [`TtlValue`] keeps both: the seconds value is
//! authoritative, the configured string is what the caller wrote and is kept
//! verbatim across reads so that `"8760h"` never shows up as a diff against
//! `31536000`.

use crate::error::{Error, Result};
use regex::Regex;

/// Duration attribute with its authoritative seconds and the caller's spelling
#[derive(Debug, Clone, Eq)]
pub struct TtlValue {
    seconds: u64,
    configured: Option<String>,
}

impl TtlValue {
    /// Parse a caller-supplied duration
    /// Supports formats: "3600", "30s", "15m", "8760h", "2d"
    pub fn parse(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        let seconds = parse_duration_seconds(trimmed)?;
        Ok(Self {
            seconds,
            configured: Some(trimmed.to_string()),
        })
    }

    /// Build from the canonical seconds the remote returns
    #[must_use]
    pub fn from_seconds(seconds: u64) -> Self {
        Self {
            seconds,
            configured: None,
        }
    }

    #[must_use]
    pub fn seconds(&self) -> u64 {
        self.seconds
    }

    /// The string the caller supplied, if this value came from local config
    #[must_use]
    pub fn configured(&self) -> Option<&str> {
        self.configured.as_deref()
    }

    /// Value sent on the wire: the caller's spelling, or canonical seconds
    #[must_use]
    pub fn to_wire(&self) -> String {
        match &self.configured {
            Some(configured) => configured.clone(),
            None => format!("{}s", self.seconds),
        }
    }

    /// Combine the remote's canonical seconds with what was known before the read.
    ///
    /// The prior spelling survives when it denotes the same number of seconds.
    /// When the remote drifted, the canonical `"<seconds>s"` form is adopted so
    /// the change is visible to the caller.
    #[must_use]
    pub fn reconcile(wire_seconds: u64, prior: Option<&TtlValue>) -> Self {
        match prior {
            Some(prior) if prior.seconds == wire_seconds && prior.configured.is_some() => {
                prior.clone()
            }
            _ => Self {
                seconds: wire_seconds,
                configured: Some(format!("{wire_seconds}s")),
            },
        }
    }
}

impl PartialEq for TtlValue {
    fn eq(&self, other: &Self) -> bool {
        self.seconds == other.seconds
    }
}

/// Parse a duration string into seconds
fn parse_duration_seconds(value: &str) -> Result<u64> {
    let invalid = |reason: String| Error::InvalidDuration {
        value: value.to_string(),
        reason,
    };

    if value.is_empty() {
        return Err(invalid("duration cannot be empty".to_string()));
    }

    let duration_regex = Regex::new(r"^(?P<number>\d+)(?P<unit>[smhd])?$")
        .map_err(|e| invalid(format!("failed to compile regex: {e}")))?;

    let lower = value.to_lowercase();
    let captures = duration_regex.captures(&lower).ok_or_else(|| {
        invalid("expected <number>[s|m|h|d] (e.g. '3600', '90m', '8760h')".to_string())
    })?;

    let number: u64 = captures
        .name("number")
        .ok_or_else(|| invalid("missing number".to_string()))?
        .as_str()
        .parse()
        .map_err(|e| invalid(format!("invalid number: {e}")))?;

    if number == 0 {
        return Err(invalid("duration must be greater than 0".to_string()));
    }

    let multiplier = match captures.name("unit").map(|m| m.as_str()) {
        None | Some("s") => 1,
        Some("m") => 60,
        Some("h") => 3600,
        Some("d") => 86_400,
        Some(unit) => return Err(invalid(format!("unknown unit '{unit}'"))),
    };

    number
        .checked_mul(multiplier)
        .ok_or_else(|| invalid("duration overflows u64 seconds".to_string()))
}
