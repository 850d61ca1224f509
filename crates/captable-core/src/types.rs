//! # Domain Types
//!
//! Stakeholder and ownership-state types shared by every stage of the fold.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Ownership State                                 │
//! │                                                                         │
//! │  total_shares == Σ founders.shares + pool.shares + Σ investors.shares  │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  FounderShare   │   │   PoolShare     │   │ InvestorShare   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id, name       │   │  shares         │   │  id, name       │       │
//! │  │  shares         │   │  percent        │   │  shares         │       │
//! │  │  percent        │   │  last_resize    │   │  percent        │       │
//! │  │  initial %      │   │  (pre / post)   │   │  investment     │       │
//! │  └─────────────────┘   └─────────────────┘   │  entry price    │       │
//! │                                              └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Semantics
//! An `OwnershipState` is never edited in place by the engine. Each round
//! clones the previous state, works on the copy and returns it.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::money::Money;

// =============================================================================
// Inputs
// =============================================================================

/// A founder's allocation at incorporation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct FounderInput {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name.
    pub name: String,

    /// Target allocation at incorporation, in percent (0-100).
    pub initial_equity_percent: f64,
}

impl FounderInput {
    /// Creates a founder allocation with a fresh UUID.
    pub fn new(name: impl Into<String>, initial_equity_percent: f64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            initial_equity_percent,
        }
    }
}

/// One reservation inside the equity pool that exists at incorporation.
///
/// Several allocations (e.g. "engineering", "advisors") collapse into the
/// single aggregate pool of the ownership state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PoolAllocation {
    pub id: String,
    pub name: String,
    /// Share of the company reserved, in percent (0-100).
    pub percent: f64,
}

impl PoolAllocation {
    /// Creates a pool allocation with a fresh UUID.
    pub fn new(name: impl Into<String>, percent: f64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            percent,
        }
    }
}

// =============================================================================
// Stakeholders
// =============================================================================

/// A founder's current holding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct FounderShare {
    pub id: String,
    pub name: String,
    /// Allocation at incorporation (carried for display).
    pub initial_equity_percent: f64,
    #[ts(type = "number")]
    pub shares: u64,
    pub ownership_percent: f64,
}

/// Whether a pool resize happened before or after the round's new money.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum PoolTiming {
    /// Pool is carved out of existing holders before pricing.
    PreMoney,
    /// Pool is topped up after the new money; everyone is diluted.
    PostMoney,
}

/// The single aggregate employee equity pool (ESOP).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PoolShare {
    #[ts(type = "number")]
    pub shares: u64,
    pub ownership_percent: f64,
    /// Timing of the most recent resize; `None` until a round resizes it.
    pub last_resize: Option<PoolTiming>,
}

/// How an investor acquired their shares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum InvestorKind {
    /// Newly issued shares bought in a priced round or note conversion.
    Primary,
    /// Existing shares bought from a founder.
    Secondary,
}

/// An investor's current holding.
///
/// Exactly one is created per event that raises new capital, and one per
/// secondary sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct InvestorShare {
    pub id: String,
    pub name: String,
    /// The event that created this investor.
    pub event_id: String,
    pub kind: InvestorKind,
    #[ts(type = "number")]
    pub shares: u64,
    pub ownership_percent: f64,
    /// Capital paid in (primary) or proceeds paid to the seller (secondary).
    pub investment_amount: Money,
    /// Price per share paid, in currency units.
    pub share_price_at_entry: f64,
}

/// Which kind of stakeholder a [`StakeholderView`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum StakeholderKind {
    Founder,
    Investor,
    Pool,
}

/// Borrowed, uniform view over any stakeholder (for display and audits).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StakeholderView<'a> {
    pub kind: StakeholderKind,
    pub id: &'a str,
    pub name: &'a str,
    pub shares: u64,
    pub ownership_percent: f64,
}

/// Identifier used for the pool in stakeholder views.
pub const POOL_ID: &str = "pool";

/// Display name used for the pool in stakeholder views.
pub const POOL_NAME: &str = "Equity Pool";

// =============================================================================
// Ownership State
// =============================================================================

/// The cap table at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OwnershipState {
    #[ts(type = "number")]
    pub total_shares: u64,
    pub founders: Vec<FounderShare>,
    pub pool: PoolShare,
    pub investors: Vec<InvestorShare>,
}

impl OwnershipState {
    /// Sum of every holder's share count.
    ///
    /// Equal to `total_shares` in every state the engine produces.
    pub fn allocated_shares(&self) -> u64 {
        self.founder_shares() + self.pool.shares + self.investor_shares()
    }

    /// Shares held by founders.
    pub fn founder_shares(&self) -> u64 {
        self.founders.iter().map(|f| f.shares).sum()
    }

    /// Shares held by investors (primary and secondary).
    pub fn investor_shares(&self) -> u64 {
        self.investors.iter().map(|i| i.shares).sum()
    }

    /// Sum of every stakeholder's ownership percent.
    pub fn percent_sum(&self) -> f64 {
        self.stakeholders().map(|s| s.ownership_percent).sum()
    }

    /// Looks up a founder by ID.
    pub fn founder(&self, id: &str) -> Option<&FounderShare> {
        self.founders.iter().find(|f| f.id == id)
    }

    /// Looks up an investor by ID.
    pub fn investor(&self, id: &str) -> Option<&InvestorShare> {
        self.investors.iter().find(|i| i.id == id)
    }

    /// Current pool size as a percent of all shares, computed from counts.
    pub fn pool_percent_of_total(&self) -> f64 {
        if self.total_shares == 0 {
            0.0
        } else {
            self.pool.shares as f64 / self.total_shares as f64 * 100.0
        }
    }

    /// Every stakeholder in canonical order: founders, investors, pool.
    ///
    /// This is also the tie-break order used by reconciliation.
    pub fn stakeholders(&self) -> impl Iterator<Item = StakeholderView<'_>> {
        let founders = self.founders.iter().map(|f| StakeholderView {
            kind: StakeholderKind::Founder,
            id: &f.id,
            name: &f.name,
            shares: f.shares,
            ownership_percent: f.ownership_percent,
        });
        let investors = self.investors.iter().map(|i| StakeholderView {
            kind: StakeholderKind::Investor,
            id: &i.id,
            name: &i.name,
            shares: i.shares,
            ownership_percent: i.ownership_percent,
        });
        let pool = std::iter::once(StakeholderView {
            kind: StakeholderKind::Pool,
            id: POOL_ID,
            name: POOL_NAME,
            shares: self.pool.shares,
            ownership_percent: self.pool.ownership_percent,
        });
        founders.chain(investors).chain(pool)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_state() -> OwnershipState {
        OwnershipState {
            total_shares: 1_000,
            founders: vec![FounderShare {
                id: "f1".to_string(),
                name: "Ada".to_string(),
                initial_equity_percent: 100.0,
                shares: 700,
                ownership_percent: 70.0,
            }],
            pool: PoolShare {
                shares: 100,
                ownership_percent: 10.0,
                last_resize: None,
            },
            investors: vec![InvestorShare {
                id: "i1".to_string(),
                name: "Seed Fund".to_string(),
                event_id: "e1".to_string(),
                kind: InvestorKind::Primary,
                shares: 200,
                ownership_percent: 20.0,
                investment_amount: Money::from_major(200),
                share_price_at_entry: 1.0,
            }],
        }
    }

    #[test]
    fn test_allocated_shares_and_percent_sum() {
        let state = sample_state();
        assert_eq!(state.allocated_shares(), state.total_shares);
        assert_eq!(state.founder_shares(), 700);
        assert_eq!(state.investor_shares(), 200);
        assert!((state.percent_sum() - 100.0).abs() < 1e-9);
        assert!((state.pool_percent_of_total() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_stakeholder_order() {
        let state = sample_state();
        let kinds: Vec<_> = state.stakeholders().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                StakeholderKind::Founder,
                StakeholderKind::Investor,
                StakeholderKind::Pool
            ]
        );
    }

    #[test]
    fn test_lookup() {
        let state = sample_state();
        assert_eq!(state.founder("f1").map(|f| f.shares), Some(700));
        assert!(state.founder("missing").is_none());
        assert_eq!(state.investor("i1").map(|i| i.kind), Some(InvestorKind::Primary));
    }

    #[test]
    fn test_state_serializes_camel_case() {
        let json = serde_json::to_value(sample_state()).unwrap();
        assert_eq!(json["totalShares"], 1_000);
        assert_eq!(json["founders"][0]["initialEquityPercent"], 100.0);
        assert_eq!(json["investors"][0]["investmentAmount"], 20_000);
        assert_eq!(json["investors"][0]["sharePriceAtEntry"], 1.0);
    }

    #[test]
    fn test_new_inputs_get_unique_ids() {
        let a = FounderInput::new("Ada", 50.0);
        let b = FounderInput::new("Grace", 50.0);
        assert_ne!(a.id, b.id);
        assert!(Uuid::parse_str(&a.id).is_ok());
        assert_eq!(PoolAllocation::new("ESOP", 10.0).percent, 10.0);
    }
}
