//! # Financing Events
//!
//! A financing event is one entry in a scenario's timeline.
//!
//! ## Event Shape
//! ```text
//! FinancingEvent { id, name, terms }
//!                            │
//!          ┌─────────────────┼──────────────────┬────────────────┐
//!          ▼                 ▼                  ▼                ▼
//!   ConvertibleNote     PricedRound         PoolResize       Secondary
//!   cap? discount?      pre XOR post        (standalone)     (standalone)
//!   + riders            + riders
//! ```
//!
//! Riders (a founder secondary sale, a pool resize) are attached to the host
//! event, not separate events. Whatever the host, they always run in the
//! same order: secondary → pre-money pool → new money → post-money pool.
//!
//! ## Document vs. Terms
//! The document form keeps the optional fields an editor produces
//! (`valuation_cap`, `discount_percent`, ...). Before pricing, they are
//! resolved into closed enums ([`ConversionTerms`], [`ValuationBasis`]) so
//! the "neither cap nor discount" case is handled exactly once.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::PoolTiming;

// =============================================================================
// Riders
// =============================================================================

/// A founder selling existing shares to a new holder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SecondarySale {
    /// Founder selling shares.
    pub founder_id: String,
    /// Name recorded for the buyer's investor entry.
    pub buyer_name: String,
    /// Shares requested; clamped to the founder's holding.
    #[ts(type = "number")]
    pub shares_sold: u64,
    /// Price per share in currency units.
    pub price_per_share: f64,
}

/// Grow the equity pool to a target percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PoolResize {
    /// Target pool size, in percent (0-100, exclusive of 100).
    pub target_percent: f64,
    pub timing: PoolTiming,
}

// =============================================================================
// Event Terms
// =============================================================================

/// Convertible note (SAFE) terms as stored in a scenario document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ConvertibleNoteTerms {
    pub capital_raised: Money,
    #[serde(default)]
    pub valuation_cap: Option<Money>,
    /// Discount in percent (25.0 = 25% off the reference price).
    #[serde(default)]
    pub discount_percent: Option<f64>,
    #[serde(default)]
    pub secondary_sale: Option<SecondarySale>,
    #[serde(default)]
    pub pool_resize: Option<PoolResize>,
}

/// Priced equity round terms as stored in a scenario document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PricedRoundTerms {
    pub capital_raised: Money,
    #[serde(default)]
    pub pre_money_valuation: Option<Money>,
    #[serde(default)]
    pub post_money_valuation: Option<Money>,
    #[serde(default)]
    pub secondary_sale: Option<SecondarySale>,
    #[serde(default)]
    pub pool_resize: Option<PoolResize>,
}

/// The closed set of event kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "camelCase")]
#[ts(export)]
pub enum EventTerms {
    /// SAFE / convertible note converting at cap and/or discount.
    ConvertibleNote(ConvertibleNoteTerms),
    /// Fixed-price equity round.
    PricedRound(PricedRoundTerms),
    /// Pool resize with no money raised.
    PoolResize(PoolResize),
    /// Founder secondary with no money raised by the company.
    Secondary(SecondarySale),
}

impl EventTerms {
    /// Secondary sale attached to (or constituting) this event.
    pub fn secondary_sale(&self) -> Option<&SecondarySale> {
        match self {
            EventTerms::ConvertibleNote(t) => t.secondary_sale.as_ref(),
            EventTerms::PricedRound(t) => t.secondary_sale.as_ref(),
            EventTerms::PoolResize(_) => None,
            EventTerms::Secondary(sale) => Some(sale),
        }
    }

    /// Pool resize attached to (or constituting) this event.
    pub fn pool_resize(&self) -> Option<PoolResize> {
        match self {
            EventTerms::ConvertibleNote(t) => t.pool_resize,
            EventTerms::PricedRound(t) => t.pool_resize,
            EventTerms::PoolResize(resize) => Some(*resize),
            EventTerms::Secondary(_) => None,
        }
    }

    /// New capital raised by the company (zero for standalone riders).
    pub fn capital_raised(&self) -> Money {
        match self {
            EventTerms::ConvertibleNote(t) => t.capital_raised,
            EventTerms::PricedRound(t) => t.capital_raised,
            EventTerms::PoolResize(_) | EventTerms::Secondary(_) => Money::zero(),
        }
    }

    /// Short label for logs and tables.
    pub fn label(&self) -> &'static str {
        match self {
            EventTerms::ConvertibleNote(_) => "convertible note",
            EventTerms::PricedRound(_) => "priced round",
            EventTerms::PoolResize(_) => "pool resize",
            EventTerms::Secondary(_) => "secondary",
        }
    }
}

/// One entry in a scenario's event list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct FinancingEvent {
    pub id: String,
    /// Display name ("Seed", "Series A", ...).
    pub name: String,
    pub terms: EventTerms,
}

impl FinancingEvent {
    /// Creates an event with a fresh UUID.
    pub fn new(name: impl Into<String>, terms: EventTerms) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            terms,
        }
    }

    /// Convenience constructor for a priced round on a pre-money valuation.
    pub fn priced_pre_money(name: impl Into<String>, capital_raised: Money, pre_money: Money) -> Self {
        Self::new(
            name,
            EventTerms::PricedRound(PricedRoundTerms {
                capital_raised,
                pre_money_valuation: Some(pre_money),
                post_money_valuation: None,
                secondary_sale: None,
                pool_resize: None,
            }),
        )
    }

    /// Convenience constructor for a convertible note.
    pub fn convertible_note(
        name: impl Into<String>,
        capital_raised: Money,
        valuation_cap: Option<Money>,
        discount_percent: Option<f64>,
    ) -> Self {
        Self::new(
            name,
            EventTerms::ConvertibleNote(ConvertibleNoteTerms {
                capital_raised,
                valuation_cap,
                discount_percent,
                secondary_sale: None,
                pool_resize: None,
            }),
        )
    }

    /// Attaches a pool resize rider. No-op on standalone secondary events.
    pub fn with_pool_resize(mut self, resize: PoolResize) -> Self {
        match &mut self.terms {
            EventTerms::ConvertibleNote(t) => t.pool_resize = Some(resize),
            EventTerms::PricedRound(t) => t.pool_resize = Some(resize),
            EventTerms::PoolResize(existing) => *existing = resize,
            EventTerms::Secondary(_) => {}
        }
        self
    }

    /// Attaches a founder secondary sale rider. No-op on pool-only events.
    pub fn with_secondary_sale(mut self, sale: SecondarySale) -> Self {
        match &mut self.terms {
            EventTerms::ConvertibleNote(t) => t.secondary_sale = Some(sale),
            EventTerms::PricedRound(t) => t.secondary_sale = Some(sale),
            EventTerms::Secondary(existing) => *existing = sale,
            EventTerms::PoolResize(_) => {}
        }
        self
    }
}

// =============================================================================
// Resolved Terms
// =============================================================================

/// How a convertible note prices its conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConversionTerms {
    Cap(Money),
    Discount(f64),
    CapAndDiscount { cap: Money, discount_percent: f64 },
}

impl ConvertibleNoteTerms {
    /// Resolves the optional cap/discount pair into a closed term set.
    ///
    /// Fails with [`CoreError::InvalidTerms`] when neither is set.
    pub fn conversion_terms(&self) -> CoreResult<ConversionTerms> {
        match (self.valuation_cap, self.discount_percent) {
            (Some(cap), Some(discount_percent)) => Ok(ConversionTerms::CapAndDiscount {
                cap,
                discount_percent,
            }),
            (Some(cap), None) => Ok(ConversionTerms::Cap(cap)),
            (None, Some(discount)) => Ok(ConversionTerms::Discount(discount)),
            (None, None) => Err(CoreError::InvalidTerms {
                reason: "convertible note needs a valuation cap or a discount".to_string(),
            }),
        }
    }
}

/// Which valuation a priced round was negotiated on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValuationBasis {
    PreMoney(Money),
    PostMoney(Money),
}

impl PricedRoundTerms {
    /// Resolves the pre/post pair. Exactly one must be set.
    pub fn valuation_basis(&self) -> Result<ValuationBasis, ValidationError> {
        match (self.pre_money_valuation, self.post_money_valuation) {
            (Some(pre), None) => Ok(ValuationBasis::PreMoney(pre)),
            (None, Some(post)) => Ok(ValuationBasis::PostMoney(post)),
            (Some(_), Some(_)) => Err(ValidationError::MutuallyExclusive {
                first: "pre-money valuation".to_string(),
                second: "post-money valuation".to_string(),
            }),
            (None, None) => Err(ValidationError::Required {
                field: "pre-money or post-money valuation".to_string(),
            }),
        }
    }

    /// Pre-money valuation, derived from post-money when needed.
    pub fn pre_money(&self) -> Result<Money, ValidationError> {
        Ok(match self.valuation_basis()? {
            ValuationBasis::PreMoney(pre) => pre,
            ValuationBasis::PostMoney(post) => post - self.capital_raised,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
