//! # State Initializer
//!
//! Builds the ownership state at incorporation from founder allocations and
//! any pre-existing equity pool.
//!
//! ## Share Assignment
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  total = config.initial_total_shares (10,000,000)                       │
//! │                                                                         │
//! │  Ada    60%  ──► round(0.60 × total) = 6,000,000                        │
//! │  Grace  30%  ──► round(0.30 × total) = 3,000,000                        │
//! │  Pool   10%  ──► Σ round(alloc × total) = 1,000,000                     │
//! │                                                                         │
//! │  Rounding remainder (if any) ──► largest holder, so Σ == total          │
//! │  Percentages are copied from input, NOT recomputed from share counts   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::debug;

use crate::config::ModelConfig;
use crate::types::{FounderInput, FounderShare, OwnershipState, PoolAllocation, PoolShare};
use crate::validation::{validate_allocations, ValidationResult};

/// Builds the time-zero ownership state.
///
/// ## Errors
/// [`crate::ValidationError`] when the allocations are malformed or do not
/// total 100% within `config.initialization_tolerance`.
///
/// ## Example
/// ```rust
/// use captable_core::{initialize, FounderInput, ModelConfig, PoolAllocation};
///
/// let founders = vec![FounderInput::new("Ada", 90.0)];
/// let pool = vec![PoolAllocation::new("ESOP", 10.0)];
/// let state = initialize(&founders, &pool, &ModelConfig::default()).unwrap();
///
/// assert_eq!(state.total_shares, 10_000_000);
/// assert_eq!(state.founders[0].shares, 9_000_000);
/// assert_eq!(state.pool.shares, 1_000_000);
/// assert!(state.investors.is_empty());
/// ```
pub fn initialize(
    founders: &[FounderInput],
    pool_allocations: &[PoolAllocation],
    config: &ModelConfig,
) -> ValidationResult<OwnershipState> {
    config.validate()?;
    validate_allocations(founders, pool_allocations, config)?;

    let total = config.initial_total_shares;

    let mut founder_shares: Vec<FounderShare> = founders
        .iter()
        .map(|f| FounderShare {
            id: f.id.clone(),
            name: f.name.trim().to_string(),
            initial_equity_percent: f.initial_equity_percent,
            shares: shares_for_percent(f.initial_equity_percent, total),
            ownership_percent: f.initial_equity_percent,
        })
        .collect();

    let mut pool = PoolShare {
        shares: pool_allocations
            .iter()
            .map(|p| shares_for_percent(p.percent, total))
            .sum(),
        ownership_percent: pool_allocations.iter().map(|p| p.percent).sum(),
        last_resize: None,
    };

    let allocated: u64 = founder_shares.iter().map(|f| f.shares).sum::<u64>() + pool.shares;
    let remainder = total as i64 - allocated as i64;
    if remainder != 0 {
        absorb_remainder(&mut founder_shares, &mut pool, remainder);
        debug!(remainder, "Assigned initial rounding remainder to largest holder");
    }

    let state = OwnershipState {
        total_shares: founder_shares.iter().map(|f| f.shares).sum::<u64>() + pool.shares,
        founders: founder_shares,
        pool,
        investors: Vec::new(),
    };

    debug!(
        founders = state.founders.len(),
        pool_shares = state.pool.shares,
        total_shares = state.total_shares,
        "Initialized ownership state"
    );

    Ok(state)
}

/// `round(percent / 100 × total)`.
fn shares_for_percent(percent: f64, total: u64) -> u64 {
    (percent / 100.0 * total as f64).round() as u64
}

/// Adds (or removes) `remainder` shares to the largest holder.
///
/// Founders win ties against the pool; the first founder wins ties among
/// founders.
fn absorb_remainder(founders: &mut [FounderShare], pool: &mut PoolShare, remainder: i64) {
    let largest_founder = founders
        .iter_mut()
        .reduce(|best, f| if f.shares > best.shares { f } else { best });

    let target = match largest_founder {
        Some(f) if f.shares >= pool.shares => &mut f.shares,
        _ => &mut pool.shares,
    };

    *target = target.saturating_add_signed(remainder);
}

// =============================================================================
// Unit Tests
// =============================================================================
