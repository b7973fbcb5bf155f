// crates/safety-forms-core/src/core/identifiers.rs
// ============================================================================
// Module: Safety Forms Identifiers
// Description: Form kind selector and database record identifiers.
// Purpose: Give the four form types and generated ids strong types.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! [`FormKind`] names one of the four inspection form types and is the key
//! the read path dispatches on. [`RecordId`] wraps the integer identifier the
//! database assigns to a master, company, or user row.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use crate::core::schema::ACCIDENTE_SCHEMA;
use crate::core::schema::BOTIQUIN_SCHEMA;
use crate::core::schema::CONTROL_OPERACIONAL_SCHEMA;
use crate::core::schema::FormSchema;
use crate::core::schema::NTP330_SCHEMA;

// ============================================================================
// SECTION: Form Kind
// ============================================================================

/// Inspection form types handled by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FormKind {
    /// Operational control checklist.
    #[serde(rename = "control-operacional")]
    ControlOperacional,
    /// First-aid kit audit.
    #[serde(rename = "botiquin")]
    Botiquin,
    /// Accident report.
    #[serde(rename = "accidente")]
    Accidente,
    /// NTP330 risk assessment.
    #[serde(rename = "ntp330")]
    Ntp330,
}

impl FormKind {
    /// Every form kind, in route order.
    pub const ALL: [Self; 4] = [Self::ControlOperacional, Self::Botiquin, Self::Accidente, Self::Ntp330];

    /// Returns the selector string used by the API.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ControlOperacional => "control-operacional",
            Self::Botiquin => "botiquin",
            Self::Accidente => "accidente",
            Self::Ntp330 => "ntp330",
        }
    }

    /// Returns the static table descriptor for this kind.
    #[must_use]
    pub const fn schema(self) -> &'static FormSchema {
        match self {
            Self::ControlOperacional => &CONTROL_OPERACIONAL_SCHEMA,
            Self::Botiquin => &BOTIQUIN_SCHEMA,
            Self::Accidente => &ACCIDENTE_SCHEMA,
            Self::Ntp330 => &NTP330_SCHEMA,
        }
    }
}

impl fmt::Display for FormKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a selector does not name a known form kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown form kind: {0}")]
pub struct UnknownFormKind(pub String);

impl FromStr for FormKind {
    type Err = UnknownFormKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| UnknownFormKind(value.to_string()))
    }
}

// ============================================================================
// SECTION: Record Identifier
// ============================================================================

/// Database-assigned row identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(i64);

impl RecordId {
    /// Wraps a raw row identifier.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw row identifier.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, reason = "Test-only assertions.")]

    use super::FormKind;

    #[test]
    fn selectors_parse_back_to_their_kind() {
        for kind in FormKind::ALL {
            assert_eq!(kind.as_str().parse::<FormKind>().unwrap(), kind);
        }
    }

    #[test]
    fn selector_match_is_exact() {
        assert!("Botiquin".parse::<FormKind>().is_err());
        assert!("control_operacional".parse::<FormKind>().is_err());
        let err = " ntp330".parse::<FormKind>().unwrap_err();
        assert_eq!(err.0, " ntp330");
    }

    #[test]
    fn serde_uses_selector_strings() {
        let value = serde_json::to_value(FormKind::ControlOperacional).unwrap();
        assert_eq!(value, serde_json::json!("control-operacional"));
    }
}
