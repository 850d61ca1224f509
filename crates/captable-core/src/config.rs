//! # Model Configuration
//!
//! Modelling assumptions that are not laws of finance and must stay
//! overridable by the caller.
//!
//! ## Defaults
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  initial_total_shares       10,000,000   shares issued at incorporation │
//! │  initialization_tolerance   0.05 pp      founders + pool vs. 100%       │
//! │  reconciliation_tolerance   0.005 pp     drift allowed before fix-up    │
//! │  reference_price_fallback   1.00         discount-only SAFE reference   │
//! │  max_founders               10                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The CLI layers a TOML file and `CAPTABLE_*` environment variables on top
//! of these defaults; the core only ever sees the resolved struct.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::validation::ValidationResult;

/// Default number of shares issued at incorporation.
pub const DEFAULT_INITIAL_TOTAL_SHARES: u64 = 10_000_000;

/// Default tolerance, in percentage points, for initial allocations.
pub const DEFAULT_INITIALIZATION_TOLERANCE: f64 = 0.05;

/// Default tolerance, in percentage points, before reconciliation kicks in.
pub const DEFAULT_RECONCILIATION_TOLERANCE: f64 = 0.005;

/// Default discount reference price when no priced round exists yet.
pub const DEFAULT_REFERENCE_PRICE: f64 = 1.0;

/// Default maximum number of founders.
pub const DEFAULT_MAX_FOUNDERS: usize = 10;

/// Engine assumptions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(default, rename_all = "camelCase")]
#[ts(export)]
pub struct ModelConfig {
    /// Shares issued at incorporation.
    #[ts(type = "number")]
    pub initial_total_shares: u64,

    /// Allowed deviation of founders + pool from 100%, in percentage points.
    pub initialization_tolerance: f64,

    /// Allowed drift of the percent sum before reconciliation adjusts it.
    pub reconciliation_tolerance: f64,

    /// Discount reference price (per share) used when the scenario has no
    /// priced round yet and the note has no cap.
    pub reference_price_fallback: f64,

    /// Maximum number of founders in a scenario.
    #[ts(type = "number")]
    pub max_founders: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            initial_total_shares: DEFAULT_INITIAL_TOTAL_SHARES,
            initialization_tolerance: DEFAULT_INITIALIZATION_TOLERANCE,
            reconciliation_tolerance: DEFAULT_RECONCILIATION_TOLERANCE,
            reference_price_fallback: DEFAULT_REFERENCE_PRICE,
            max_founders: DEFAULT_MAX_FOUNDERS,
        }
    }
}

impl ModelConfig {
    /// Checks that the assumptions themselves are usable.
    pub fn validate(&self) -> ValidationResult<()> {
        if self.initial_total_shares == 0 {
            return Err(ValidationError::MustBePositive {
                field: "initial total shares".to_string(),
            });
        }

        for (field, value) in [
            ("initialization tolerance", self.initialization_tolerance),
            ("reconciliation tolerance", self.reconciliation_tolerance),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ValidationError::OutOfRange {
                    field: field.to_string(),
                    min: 0.0,
                    max: 1.0,
                    actual: value,
                });
            }
        }

        if !(self.reference_price_fallback.is_finite() && self.reference_price_fallback > 0.0) {
            return Err(ValidationError::MustBePositive {
                field: "reference price fallback".to_string(),
            });
        }

        if self.max_founders == 0 {
            return Err(ValidationError::MustBePositive {
                field: "max founders".to_string(),
            });
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
