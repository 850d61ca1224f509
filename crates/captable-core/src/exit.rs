//! # Exit Simulator
//!
//! Projects a company sale price onto an ownership state.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  exit $50,000,000                                                       │
//! │                                                                         │
//! │  Ada        57.60%  ──► $28,800,000                                     │
//! │  Seed       20.00%  ──► $10,000,000   (10.0× on $1,000,000)             │
//! │  Pool        8.00%  ──►  $4,000,000                                     │
//! │  ...                                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Common-stock pro rata only: liquidation preferences, participation and
//! ratchets are not modelled.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{InvestorKind, OwnershipState};

/// A founder's share of the exit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct FounderPayout {
    pub id: String,
    pub name: String,
    pub ownership_percent: f64,
    pub cash_return: Money,
}

/// An investor's share of the exit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct InvestorPayout {
    pub id: String,
    pub name: String,
    pub kind: InvestorKind,
    pub ownership_percent: f64,
    pub investment_amount: Money,
    pub cash_return: Money,
    /// `cash_return / investment_amount`; 0 when nothing was invested.
    pub multiple: f64,
}

/// Cash distribution at a hypothetical exit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ExitResult {
    pub exit_valuation: Money,
    pub founders: Vec<FounderPayout>,
    pub investors: Vec<InvestorPayout>,
    pub pool_value: Money,
    /// Sum of every payout plus the pool value.
    pub total_distributed: Money,
}

/// Distributes `exit_valuation` pro rata to ownership percent.
///
/// Pure: the state is only borrowed, and the same arguments always give the
/// same result.
///
/// ## Errors
/// [`CoreError::InvalidExitValuation`] for a negative valuation.
///
/// ## Example
/// ```rust
/// use captable_core::{initialize, simulate_exit, FounderInput, ModelConfig, Money};
///
/// let state = initialize(&[FounderInput::new("Ada", 100.0)], &[], &ModelConfig::default()).unwrap();
/// let result = simulate_exit(&state, Money::from_major(1_000_000)).unwrap();
/// assert_eq!(result.founders[0].cash_return, Money::from_major(1_000_000));
/// ```
pub fn simulate_exit(state: &OwnershipState, exit_valuation: Money) -> CoreResult<ExitResult> {
    if exit_valuation.is_negative() {
        return Err(CoreError::InvalidExitValuation {
            cents: exit_valuation.cents(),
        });
    }

    let founders: Vec<FounderPayout> = state
        .founders
        .iter()
        .map(|f| FounderPayout {
            id: f.id.clone(),
            name: f.name.clone(),
            ownership_percent: f.ownership_percent,
            cash_return: exit_valuation.percent_of(f.ownership_percent),
        })
        .collect();

    let investors: Vec<InvestorPayout> = state
        .investors
        .iter()
        .map(|i| {
            let cash_return = exit_valuation.percent_of(i.ownership_percent);
            InvestorPayout {
                id: i.id.clone(),
                name: i.name.clone(),
                kind: i.kind,
                ownership_percent: i.ownership_percent,
                investment_amount: i.investment_amount,
                cash_return,
                multiple: cash_return.ratio_to(i.investment_amount),
            }
        })
        .collect();

    let pool_value = exit_valuation.percent_of(state.pool.ownership_percent);

    let total_distributed = founders.iter().map(|f| f.cash_return).sum::<Money>()
        + investors.iter().map(|i| i.cash_return).sum::<Money>()
        + pool_value;

    Ok(ExitResult {
        exit_valuation,
        founders,
        investors,
        pool_value,
        total_distributed,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
