//! # Percent Re-normalization and Reconciliation
//!
//! The last two steps of every round.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. renormalize: percent = shares / total × 100 for every holder        │
//! │                                                                         │
//! │  2. reconcile:                                                          │
//! │     raw drift > tolerance?  ──► warn! (share counts don't add up: bug)  │
//! │     round every percent to 2 dp                                         │
//! │     residual = 100.00 − Σ rounded                                       │
//! │     diluted since the previous state? ──► cap at the previous percent  │
//! │     |residual| > tolerance? ──► add it to the single largest holder     │
//! │                                 (ties: founders, investors, pool);      │
//! │                                 a positive residual never breaks a cap  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Example: three equal holders at 33.333...% round to 33.33% each (99.99%);
//! the first one is shown as 33.34% so the table adds up to 100.00%.

use tracing::{debug, warn};

use crate::types::OwnershipState;

/// Rounds a percentage to 2 decimal places.
pub fn round_percent(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Recomputes every percent from share counts.
pub fn renormalize(state: &mut OwnershipState) {
    let total = state.total_shares;
    let percent = |shares: u64| {
        if total == 0 {
            0.0
        } else {
            shares as f64 * 100.0 / total as f64
        }
    };

    for founder in &mut state.founders {
        founder.ownership_percent = percent(founder.shares);
    }
    for investor in &mut state.investors {
        investor.ownership_percent = percent(investor.shares);
    }
    state.pool.ownership_percent = percent(state.pool.shares);
}

/// Identifies one stakeholder slot inside a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Founder(usize),
    Investor(usize),
    Pool,
}

fn percent_at(state: &OwnershipState, slot: Slot) -> f64 {
    match slot {
        Slot::Founder(i) => state.founders[i].ownership_percent,
        Slot::Investor(i) => state.investors[i].ownership_percent,
        Slot::Pool => state.pool.ownership_percent,
    }
}

fn percent_at_mut(state: &mut OwnershipState, slot: Slot) -> &mut f64 {
    match slot {
        Slot::Founder(i) => &mut state.founders[i].ownership_percent,
        Slot::Investor(i) => &mut state.investors[i].ownership_percent,
        Slot::Pool => &mut state.pool.ownership_percent,
    }
}

/// Largest holder by percent among `eligible` slots; the first one in
/// canonical order wins ties.
fn largest_holder(state: &OwnershipState, eligible: impl Fn(Slot) -> bool) -> Option<Slot> {
    let slots = (0..state.founders.len())
        .map(Slot::Founder)
        .chain((0..state.investors.len()).map(Slot::Investor))
        .chain(std::iter::once(Slot::Pool));

    let mut best: Option<(Slot, f64)> = None;
    for slot in slots.filter(|s| eligible(*s)) {
        let p = percent_at(state, slot);
        if best.map_or(true, |(_, best_percent)| p > best_percent) {
            best = Some((slot, p));
        }
    }
    best.map(|(slot, _)| slot)
}

/// Largest 2-dp value that does not exceed `value`.
fn floor_percent(value: f64) -> f64 {
    let rounded = round_percent(value);
    if rounded > value + 1e-9 {
        round_percent(rounded - 0.01)
    } else {
        rounded
    }
}

/// Ceilings for holders that were diluted (or left untouched) since
/// `previous`: same or fewer shares out of the same or a larger total.
fn dilution_caps(state: &OwnershipState, previous: &OwnershipState) -> Vec<(Slot, f64)> {
    if state.total_shares < previous.total_shares {
        return Vec::new();
    }

    let founders = state.founders.iter().enumerate().filter_map(|(i, f)| {
        previous
            .founder(&f.id)
            .filter(|before| f.shares <= before.shares)
            .map(|before| (Slot::Founder(i), floor_percent(before.ownership_percent)))
    });
    let investors = state.investors.iter().enumerate().filter_map(|(i, inv)| {
        previous
            .investor(&inv.id)
            .filter(|before| inv.shares <= before.shares)
            .map(|before| (Slot::Investor(i), floor_percent(before.ownership_percent)))
    });
    let pool = (state.pool.shares <= previous.pool.shares)
        .then(|| (Slot::Pool, floor_percent(previous.pool.ownership_percent)));

    founders.chain(investors).chain(pool).collect()
}

/// Rounds percentages for display and folds the rounding residual into the
/// largest holder.
///
/// With a `previous` state, no holder that was diluted since then ends up
/// above its previous percent: rounding is capped, and a positive residual
/// goes to the largest holder it would not push past its cap (falling back
/// to the largest holder overall).
///
/// Returns the adjustment applied (0.0 when none was needed).
pub fn reconcile(state: &mut OwnershipState, previous: Option<&OwnershipState>, tolerance: f64) -> f64 {
    let raw_drift = 100.0 - state.percent_sum();
    if raw_drift.abs() > tolerance {
        warn!(
            raw_drift,
            total_shares = state.total_shares,
            allocated_shares = state.allocated_shares(),
            "Percentages drift before rounding; share counts are inconsistent"
        );
    }

    for founder in &mut state.founders {
        founder.ownership_percent = round_percent(founder.ownership_percent);
    }
    for investor in &mut state.investors {
        investor.ownership_percent = round_percent(investor.ownership_percent);
    }
    state.pool.ownership_percent = round_percent(state.pool.ownership_percent);

    let caps = previous.map_or_else(Vec::new, |prev| dilution_caps(state, prev));
    for &(slot, cap) in &caps {
        let percent = percent_at_mut(state, slot);
        if *percent > cap {
            *percent = cap;
        }
    }

    let residual = round_percent(100.0 - state.percent_sum());
    if residual.abs() <= tolerance {
        return 0.0;
    }

    let has_room = |slot: Slot| match caps.iter().find(|(capped, _)| *capped == slot) {
        Some(&(_, cap)) => percent_at(&*state, slot) + residual <= cap + 1e-9,
        None => true,
    };
    let slot = if residual > 0.0 {
        largest_holder(state, has_room).or_else(|| largest_holder(state, |_| true))
    } else {
        largest_holder(state, |_| true)
    };
    let Some(slot) = slot else {
        return 0.0;
    };

    let target = percent_at_mut(state, slot);
    *target = round_percent(*target + residual);

    debug!(residual, holder = ?slot, "Reconciled rounding residual");
    residual
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::{FounderShare, InvestorKind, InvestorShare, PoolShare};

    fn founder(id: &str, shares: u64) -> FounderShare {
        FounderShare {
            id: id.to_string(),
            name: id.to_string(),
            initial_equity_percent: 0.0,
            shares,
            ownership_percent: 0.0,
        }
    }

    fn investor(id: &str, shares: u64) -> InvestorShare {
        InvestorShare {
            id: id.to_string(),
            name: id.to_string(),
            event_id: "e".to_string(),
            kind: InvestorKind::Primary,
            shares,
            ownership_percent: 0.0,
            investment_amount: Money::zero(),
            share_price_at_entry: 1.0,
        }
    }

    fn state(founders: Vec<FounderShare>, investors: Vec<InvestorShare>, pool: u64) -> OwnershipState {
        let mut state = OwnershipState {
            total_shares: 0,
            founders,
            pool: PoolShare {
                shares: pool,
                ..PoolShare::default()
            },
            investors,
        };
        state.total_shares = state.allocated_shares();
        state
    }

    #[test]
    fn test_round_percent() {
        assert_eq!(round_percent(90.909090), 90.91);
        assert_eq!(round_percent(9.090909), 9.09);
        assert_eq!(round_percent(12.3456), 12.35);
    }

    #[test]
    fn test_renormalize() {
        let mut s = state(vec![founder("a", 8)], vec![investor("i", 2)], 0);
        renormalize(&mut s);
        assert_eq!(s.founders[0].ownership_percent, 80.0);
        assert_eq!(s.investors[0].ownership_percent, 20.0);
        assert_eq!(s.pool.ownership_percent, 0.0);
    }

    #[test]
    fn test_three_way_split_sums_to_100() {
        let mut s = state(vec![founder("a", 1), founder("b", 1), founder("c", 1)], vec![], 0);
        renormalize(&mut s);
        let adjustment = reconcile(&mut s, None, 0.005);

        assert!((adjustment - 0.01).abs() < 1e-9);
        assert_eq!(s.founders[0].ownership_percent, 33.34);
        assert_eq!(s.founders[1].ownership_percent, 33.33);
        assert_eq!(s.founders[2].ownership_percent, 33.33);
        assert!((s.percent_sum() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_adjustment_when_rounding_is_exact() {
        let mut s = state(vec![founder("a", 10)], vec![investor("i", 1)], 0);
        renormalize(&mut s);
        let adjustment = reconcile(&mut s, None, 0.005);

        assert_eq!(adjustment, 0.0);
        assert_eq!(s.founders[0].ownership_percent, 90.91);
        assert_eq!(s.investors[0].ownership_percent, 9.09);
    }

    #[test]
    fn test_tie_break_prefers_founders_then_investors() {
        // 1/3 each across founder, investor, pool: founder absorbs residual.
        let mut s = state(vec![founder("a", 1)], vec![investor("i", 1)], 1);
        renormalize(&mut s);
        reconcile(&mut s, None, 0.005);
        assert_eq!(s.founders[0].ownership_percent, 33.34);
        assert_eq!(s.investors[0].ownership_percent, 33.33);
        assert_eq!(s.pool.ownership_percent, 33.33);

        // Investor strictly largest: investor absorbs the -0.01 residual
        // (16.67 + 16.67 + 66.67 = 100.01).
        let mut s = state(vec![founder("a", 1), founder("b", 1)], vec![investor("i", 4)], 0);
        renormalize(&mut s);
        let adjustment = reconcile(&mut s, None, 0.005);
        assert!((adjustment + 0.01).abs() < 1e-9);
        assert_eq!(s.founders[0].ownership_percent, 16.67);
        assert_eq!(s.investors[0].ownership_percent, 66.66);
        assert!((s.percent_sum() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_diluted_holder_never_rises() {
        let mut before = state(vec![founder("a", 1000), founder("b", 1000)], vec![], 1000);
        before.founders[0].ownership_percent = 33.33;
        before.founders[1].ownership_percent = 33.33;
        before.pool.ownership_percent = 33.34;

        // Pool shares sold to a new investor: the residual would land on the
        // first founder without the cap.
        let mut s = state(vec![founder("a", 1000), founder("b", 1000)], vec![investor("i", 1000)], 0);
        renormalize(&mut s);
        reconcile(&mut s, Some(&before), 0.005);

        assert_eq!(s.founders[0].ownership_percent, 33.33);
        assert_eq!(s.founders[1].ownership_percent, 33.33);
        assert_eq!(s.investors[0].ownership_percent, 33.34);
        assert!((s.percent_sum() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_rounding_up_is_capped_after_dilution() {
        let mut before = state(vec![founder("a", 5000)], vec![], 0);
        before.total_shares = 10_000;
        before.founders[0].ownership_percent = 49.99;

        let mut s = state(vec![founder("a", 5000)], vec![investor("i", 5001)], 0);
        renormalize(&mut s);
        reconcile(&mut s, Some(&before), 0.005);

        assert_eq!(s.founders[0].ownership_percent, 49.99);
        assert_eq!(s.investors[0].ownership_percent, 50.01);
        assert!((s.percent_sum() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_floor_percent() {
        assert_eq!(floor_percent(48.755), 48.75);
        assert_eq!(floor_percent(48.75), 48.75);
        assert_eq!(floor_percent(33.3333), 33.33);
    }
}
