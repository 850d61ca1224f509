//! # Validation Module
//!
//! Input validation for scenarios, allocations and financing events.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Editor / CLI                                                 │
//! │  ├── Deserialization (types, required JSON fields)                     │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Allocation totals, founder limits, names                          │
//! │  └── Event terms: capital, valuations, discount, pool target           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Engine                                                       │
//! │  └── Runs only on input that passed layer 2                            │
//! │                                                                         │
//! │  Every check runs BEFORE a new state is built, so a rejected round     │
//! │  never leaves a partially applied state behind.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use captable_core::validation::{validate_percent, validate_name};
//!
//! assert!(validate_percent("pool target", 15.0).is_ok());
//! assert!(validate_name("founder name", "").is_err());
//! ```

use std::collections::HashSet;

use crate::config::ModelConfig;
use crate::error::{CoreResult, ValidationError};
use crate::event::{EventTerms, FinancingEvent, PoolResize, SecondarySale};
use crate::money::Money;
use crate::types::{FounderInput, OwnershipState, PoolAllocation};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum length for founder, pool allocation, event and scenario names.
pub const MAX_NAME_LEN: usize = 200;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a display name.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most [`MAX_NAME_LEN`] characters
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a UUID string format.
///
/// ## Example
/// ```rust
/// use captable_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a percentage in `[0, 100]`.
pub fn validate_percent(field: &str, value: f64) -> ValidationResult<()> {
    if !value.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must be a finite number".to_string(),
        });
    }

    if value < 0.0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }

    if value > 100.0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0.0,
            max: 100.0,
            actual: value,
        });
    }

    Ok(())
}

/// Validates an amount that must be strictly positive (capital, cap, valuation).
pub fn validate_positive_money(field: &str, amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a per-share price.
pub fn validate_share_price(field: &str, price: f64) -> ValidationResult<()> {
    if !(price.is_finite() && price > 0.0) {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a convertible note discount.
///
/// ## Rules
/// - Strictly between 0 and 100 (a 100% discount would mean free shares)
pub fn validate_discount(discount_percent: f64) -> ValidationResult<()> {
    if !(discount_percent.is_finite() && discount_percent > 0.0 && discount_percent < 100.0) {
        return Err(ValidationError::OutOfRange {
            field: "discount".to_string(),
            min: 0.0,
            max: 100.0,
            actual: discount_percent,
        });
    }

    Ok(())
}

/// Validates an exit valuation (zero is a valid, if sad, outcome).
pub fn validate_exit_valuation(valuation: Money) -> ValidationResult<()> {
    if valuation.is_negative() {
        return Err(ValidationError::Negative {
            field: "exit valuation".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Allocation Validators
// =============================================================================

/// Validates the incorporation allocations.
///
/// ## Rules
/// - 1..=`max_founders` founders, unique IDs, non-empty names
/// - Every percentage within [0, 100]
/// - Founders + pool total 100% within `initialization_tolerance`
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Scenario: Set Up Founders                                              │
/// │                                                                         │
/// │  Ada 60% + Grace 30% + Pool 10%                                        │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_allocations() ← THIS FUNCTION                                │
/// │       │                                                                 │
/// │       ├── total 99.0%? → Error: "must total 100% (±0.05)"              │
/// │       │                                                                 │
/// │       └── OK → initialize()                                            │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_allocations(
    founders: &[FounderInput],
    pool_allocations: &[PoolAllocation],
    config: &ModelConfig,
) -> ValidationResult<()> {
    if founders.is_empty() {
        return Err(ValidationError::Required {
            field: "founders".to_string(),
        });
    }

    if founders.len() > config.max_founders {
        return Err(ValidationError::TooMany {
            field: "founders".to_string(),
            max: config.max_founders,
            actual: founders.len(),
        });
    }

    let mut seen = HashSet::new();
    for founder in founders {
        validate_name("founder name", &founder.name)?;
        validate_percent("founder equity", founder.initial_equity_percent)?;
        if !seen.insert(founder.id.as_str()) {
            return Err(ValidationError::Duplicate {
                field: "founder id".to_string(),
                value: founder.id.clone(),
            });
        }
    }

    for allocation in pool_allocations {
        validate_name("pool allocation name", &allocation.name)?;
        validate_percent("pool allocation", allocation.percent)?;
    }

    let total: f64 = founders
        .iter()
        .map(|f| f.initial_equity_percent)
        .chain(pool_allocations.iter().map(|p| p.percent))
        .sum();

    if (total - 100.0).abs() > config.initialization_tolerance {
        return Err(ValidationError::AllocationMismatch {
            total,
            tolerance: config.initialization_tolerance,
        });
    }

    Ok(())
}

// =============================================================================
// Event Validators
// =============================================================================

/// Validates a financing event against the state it will be applied to.
///
/// Covers everything that can fail during [`crate::round::apply_round`],
/// so the round itself only runs on input that is known to be good.
pub fn validate_event(event: &FinancingEvent, state: &OwnershipState) -> CoreResult<()> {
    validate_name("event name", &event.name)?;

    match &event.terms {
        EventTerms::ConvertibleNote(terms) => {
            validate_positive_money("capital raised", terms.capital_raised)?;
            if let Some(cap) = terms.valuation_cap {
                validate_positive_money("valuation cap", cap)?;
            }
            if let Some(discount) = terms.discount_percent {
                validate_discount(discount)?;
            }
            terms.conversion_terms()?;
        }
        EventTerms::PricedRound(terms) => {
            validate_positive_money("capital raised", terms.capital_raised)?;
            if let Some(pre) = terms.pre_money_valuation {
                validate_positive_money("pre-money valuation", pre)?;
            }
            if let Some(post) = terms.post_money_valuation {
                if post <= terms.capital_raised {
                    return Err(ValidationError::OutOfRange {
                        field: "post-money valuation".to_string(),
                        min: terms.capital_raised.as_major(),
                        max: f64::INFINITY,
                        actual: post.as_major(),
                    }
                    .into());
                }
            }
            terms.valuation_basis()?;
        }
        EventTerms::PoolResize(_) | EventTerms::Secondary(_) => {}
    }

    if let Some(sale) = event.terms.secondary_sale() {
        validate_secondary_sale(sale, state)?;
    }

    if let Some(resize) = event.terms.pool_resize() {
        validate_pool_resize(&resize)?;
    }

    Ok(())
}

/// Validates a secondary sale against the current holders.
pub fn validate_secondary_sale(sale: &SecondarySale, state: &OwnershipState) -> ValidationResult<()> {
    validate_name("buyer name", &sale.buyer_name)?;
    validate_share_price("secondary price per share", sale.price_per_share)?;

    if state.founder(&sale.founder_id).is_none() {
        return Err(ValidationError::UnknownFounder(sale.founder_id.clone()));
    }

    Ok(())
}

/// Validates a pool resize target.
///
/// ## Rules
/// - Within [0, 100); a pool of 100% would leave nothing for anyone else
pub fn validate_pool_resize(resize: &PoolResize) -> ValidationResult<()> {
    validate_percent("pool target", resize.target_percent)?;

    if resize.target_percent >= 100.0 {
        return Err(ValidationError::OutOfRange {
            field: "pool target".to_string(),
            min: 0.0,
            max: 100.0,
            actual: resize.target_percent,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
