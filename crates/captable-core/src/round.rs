//! # Round Processor
//!
//! Applies one financing event to an ownership state and returns the next
//! state together with the round's computed facts.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        apply_round(state, event)                        │
//! │                                                                         │
//! │  0. validate_event ─────── any error here: nothing was built            │
//! │  1. secondary sale ─────── founder → buyer, total unchanged             │
//! │  2. pre-money pool ─────── founders give up shares, total unchanged     │
//! │  3. primary pricing ────── priced: pre / total                          │
//! │                            note:   min(cap price, discount price)       │
//! │  4. new investor ───────── round(capital / price) new shares            │
//! │  5. post-money pool ────── new pool shares, everyone diluted            │
//! │  6. renormalize ────────── percent = shares / total                     │
//! │  7. reconcile ──────────── 2 dp, residual to largest holder             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The previous state is only ever borrowed; the round works on a clone, so
//! a failure at any step leaves the caller's state exactly as it was.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use ts_rs::TS;
use uuid::Uuid;

use crate::config::ModelConfig;
use crate::error::{CoreResult, ValidationError};
use crate::event::{ConversionTerms, ConvertibleNoteTerms, EventTerms, FinancingEvent, PoolResize, PricedRoundTerms, SecondarySale, ValuationBasis};
use crate::money::Money;
use crate::reconcile::{reconcile, renormalize};
use crate::types::{InvestorKind, InvestorShare, OwnershipState, PoolTiming};
use crate::validation::validate_event;

// =============================================================================
// Context & Outcome
// =============================================================================

/// Everything a round needs besides the state and the event.
#[derive(Debug, Clone, Copy)]
pub struct RoundContext<'a> {
    pub config: &'a ModelConfig,
    /// Share price of the most recent priced round earlier in the scenario.
    pub last_priced_share_price: Option<f64>,
}

impl<'a> RoundContext<'a> {
    /// Context for the first event of a scenario.
    pub fn new(config: &'a ModelConfig) -> Self {
        Self {
            config,
            last_priced_share_price: None,
        }
    }

    /// Returns a copy with the reference price of a previous priced round.
    pub fn with_last_priced_share_price(mut self, price: Option<f64>) -> Self {
        self.last_priced_share_price = price;
        self
    }
}

/// Where the round's share price came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum PriceSource {
    PreMoneyValuation,
    PostMoneyValuation,
    ValuationCap,
    Discount,
    SecondarySale,
    /// Pool-only event: nothing was priced.
    Unpriced,
}

/// Audit trail of a convertible note conversion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NoteConversion {
    pub cap_price: Option<f64>,
    pub discount_price: Option<f64>,
    /// Price the discount was applied to (when a discount is set).
    pub reference_price: Option<f64>,
}

/// Result of applying one event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RoundOutcome {
    pub next_state: OwnershipState,
    /// Price per share in currency units.
    pub share_price: f64,
    pub price_source: PriceSource,
    #[ts(type = "number")]
    pub new_shares_issued: u64,
    pub pre_money_valuation: Money,
    pub post_money_valuation: Money,
    /// Present for convertible notes only.
    pub conversion: Option<NoteConversion>,
    /// Percentage points moved onto the largest holder by reconciliation.
    pub reconciliation_adjustment: f64,
}

impl RoundOutcome {
    /// True when this round set a new priced-round reference price.
    pub fn is_priced_round(&self) -> bool {
        matches!(
            self.price_source,
            PriceSource::PreMoneyValuation | PriceSource::PostMoneyValuation
        )
    }
}

/// Pricing result of step 3.
struct Pricing {
    share_price: f64,
    source: PriceSource,
    pre_money: Money,
    conversion: Option<NoteConversion>,
}

// =============================================================================
// Entry Point
// =============================================================================

/// Applies `event` to `state`.
///
/// ## Errors
/// - [`crate::CoreError::Validation`] for malformed input (non-positive
///   capital, missing valuation, unknown founder, unreachable pool target)
/// - [`crate::CoreError::InvalidTerms`] for a note with neither cap nor
///   discount
///
/// ## Example
/// ```rust
/// use captable_core::{apply_round, initialize, FinancingEvent, FounderInput, ModelConfig, Money, RoundContext};
///
/// let config = ModelConfig::default();
/// let state = initialize(&[FounderInput::new("Ada", 100.0)], &[], &config).unwrap();
/// let seed = FinancingEvent::priced_pre_money("Seed", Money::from_major(1_000_000), Money::from_major(4_000_000));
///
/// let outcome = apply_round(&state, &seed, &RoundContext::new(&config)).unwrap();
/// assert_eq!(outcome.new_shares_issued, 2_500_000);
/// assert_eq!(outcome.next_state.total_shares, 12_500_000);
/// assert_eq!(outcome.next_state.founders[0].ownership_percent, 80.0);
/// ```
pub fn apply_round(
    state: &OwnershipState,
    event: &FinancingEvent,
    ctx: &RoundContext<'_>,
) -> CoreResult<RoundOutcome> {
    validate_event(event, state)?;

    let mut next = state.clone();
    let pool_resize = event.terms.pool_resize();

    // 1. Secondary sale.
    let mut secondary_price = None;
    if let Some(sale) = event.terms.secondary_sale() {
        apply_secondary_sale(&mut next, sale, &event.id);
        secondary_price = Some(sale.price_per_share);
    }

    // 2. Pre-money pool resize.
    if let Some(resize) = pool_resize.filter(|r| r.timing == PoolTiming::PreMoney) {
        apply_pre_money_pool(&mut next, &resize)?;
    }

    // 3. Primary pricing against the post-step-2 share count.
    let capital = event.terms.capital_raised();
    let shares_before_raise = next.total_shares;
    let pricing = match &event.terms {
        EventTerms::PricedRound(terms) => price_priced_round(terms, shares_before_raise)?,
        EventTerms::ConvertibleNote(terms) => price_convertible_note(terms, shares_before_raise, ctx)?,
        EventTerms::Secondary(_) | EventTerms::PoolResize(_) => match secondary_price {
            Some(price) => Pricing {
                share_price: price,
                source: PriceSource::SecondarySale,
                pre_money: Money::for_shares(shares_before_raise, price),
                conversion: None,
            },
            None => Pricing {
                share_price: 0.0,
                source: PriceSource::Unpriced,
                pre_money: Money::zero(),
                conversion: None,
            },
        },
    };

    let new_shares_issued = if capital.is_positive() && pricing.share_price > 0.0 {
        shares_to_issue(
            "new shares issued",
            capital.as_major() / pricing.share_price,
            next.total_shares,
        )?
    } else {
        0
    };
    next.total_shares = add_shares("total shares", next.total_shares, new_shares_issued)?;

    // 4. New primary investor.
    if new_shares_issued > 0 {
        next.investors.push(InvestorShare {
            id: Uuid::new_v4().to_string(),
            name: event.name.trim().to_string(),
            event_id: event.id.clone(),
            kind: InvestorKind::Primary,
            shares: new_shares_issued,
            ownership_percent: 0.0,
            investment_amount: capital,
            share_price_at_entry: pricing.share_price,
        });
    }
    trace!(new_shares_issued, share_price = pricing.share_price, "Primary raise applied");

    // 5. Post-money pool resize.
    if let Some(resize) = pool_resize.filter(|r| r.timing == PoolTiming::PostMoney) {
        apply_post_money_pool(&mut next, &resize)?;
    }

    // 6 + 7. Percentages.
    renormalize(&mut next);
    let reconciliation_adjustment =
        reconcile(&mut next, Some(state), ctx.config.reconciliation_tolerance);

    let outcome = RoundOutcome {
        next_state: next,
        share_price: pricing.share_price,
        price_source: pricing.source,
        new_shares_issued,
        pre_money_valuation: pricing.pre_money,
        post_money_valuation: pricing.pre_money + capital,
        conversion: pricing.conversion,
        reconciliation_adjustment,
    };

    debug!(
        event = %event.name,
        kind = event.terms.label(),
        share_price = outcome.share_price,
        new_shares = outcome.new_shares_issued,
        total_shares = outcome.next_state.total_shares,
        post_money = %outcome.post_money_valuation,
        "Applied round"
    );

    Ok(outcome)
}

// =============================================================================
// Step 1: Secondary Sale
// =============================================================================

/// Moves shares from a founder to a new secondary investor.
///
/// The transfer is clamped to the founder's holding. Validation has already
/// checked that the founder exists.
fn apply_secondary_sale(state: &mut OwnershipState, sale: &SecondarySale, event_id: &str) {
    let Some(founder) = state.founders.iter_mut().find(|f| f.id == sale.founder_id) else {
        return;
    };

    let transferred = sale.shares_sold.min(founder.shares);
    if transferred < sale.shares_sold {
        debug!(
            founder = %founder.name,
            requested = sale.shares_sold,
            held = founder.shares,
            "Secondary sale clamped to founder holding"
        );
    }
    founder.shares -= transferred;

    if transferred == 0 {
        return;
    }

    state.investors.push(InvestorShare {
        id: Uuid::new_v4().to_string(),
        name: sale.buyer_name.trim().to_string(),
        event_id: event_id.to_string(),
        kind: InvestorKind::Secondary,
        shares: transferred,
        ownership_percent: 0.0,
        investment_amount: Money::for_shares(transferred, sale.price_per_share),
        share_price_at_entry: sale.price_per_share,
    });
    trace!(transferred, "Secondary sale applied");
}

// =============================================================================
// Step 2: Pre-Money Pool
// =============================================================================

/// Splits `target` shares across `holdings` pro rata so the parts add up to
/// `target` exactly (largest remainder; earlier holders win ties).
///
/// Every part is within one share of the exact pro-rata value.
fn apportion(holdings: &[u64], target: u64) -> Vec<u64> {
    let total: u128 = holdings.iter().map(|&h| h as u128).sum();
    if total == 0 {
        return vec![0; holdings.len()];
    }

    let exact: Vec<(u64, u128)> = holdings
        .iter()
        .map(|&h| {
            let scaled = h as u128 * target as u128;
            ((scaled / total) as u64, scaled % total)
        })
        .collect();

    let mut parts: Vec<u64> = exact.iter().map(|(floor, _)| *floor).collect();
    let mut short = target - parts.iter().sum::<u64>();

    let mut order: Vec<usize> = (0..exact.len()).collect();
    order.sort_by(|&a, &b| exact[b].1.cmp(&exact[a].1).then(a.cmp(&b)));
    for i in order {
        if short == 0 {
            break;
        }
        parts[i] += 1;
        short -= 1;
    }
    parts
}

/// Grows the pool to `target%` of the unchanged total by taking shares from
/// founders pro rata.
///
/// Investors are never diluted by this step, including a secondary buyer
/// created earlier in the same event. With no investors the founder factor
/// is exactly `total / new_total` where `new_total = non_pool / (1 - t)`.
fn apply_pre_money_pool(state: &mut OwnershipState, resize: &PoolResize) -> CoreResult<()> {
    if resize.target_percent <= state.pool_percent_of_total() {
        trace!(target_percent = resize.target_percent, "Pre-money pool already at target");
        return Ok(());
    }

    let total = state.total_shares;
    let investor_shares = state.investor_shares();
    let founder_shares = state.founder_shares();
    let pool_target = (resize.target_percent / 100.0 * total as f64).round() as u64;

    let founders_after = total
        .checked_sub(pool_target)
        .and_then(|rest| rest.checked_sub(investor_shares))
        .filter(|_| founder_shares > 0)
        .ok_or(ValidationError::PoolTargetUnreachable {
            target: resize.target_percent,
        })?;

    let holdings: Vec<u64> = state.founders.iter().map(|f| f.shares).collect();
    for (founder, shares) in state.founders.iter_mut().zip(apportion(&holdings, founders_after)) {
        founder.shares = shares;
    }

    let pool_before = state.pool.shares;
    state.pool.shares = pool_target;
    state.pool.last_resize = Some(PoolTiming::PreMoney);

    trace!(
        target_percent = resize.target_percent,
        pool_before,
        pool_after = state.pool.shares,
        "Pre-money pool resized"
    );
    Ok(())
}

// =============================================================================
// Step 3: Pricing
// =============================================================================

fn price_priced_round(terms: &PricedRoundTerms, shares: u64) -> CoreResult<Pricing> {
    let basis = terms.valuation_basis()?;
    let pre_money = terms.pre_money()?;
    let source = match basis {
        ValuationBasis::PreMoney(_) => PriceSource::PreMoneyValuation,
        ValuationBasis::PostMoney(_) => PriceSource::PostMoneyValuation,
    };

    Ok(Pricing {
        share_price: pre_money.as_major() / shares as f64,
        source,
        pre_money,
        conversion: None,
    })
}

/// Prices a note at the lower of its cap price and discount price.
///
/// The discount applies to a reference price: the last priced round's share
/// price, else the cap price, else `config.reference_price_fallback`.
fn price_convertible_note(
    terms: &ConvertibleNoteTerms,
    shares: u64,
    ctx: &RoundContext<'_>,
) -> CoreResult<Pricing> {
    let cap_price_for = |cap: Money| cap.as_major() / shares as f64;
    let reference_for = |cap_price: Option<f64>| {
        ctx.last_priced_share_price
            .or(cap_price)
            .unwrap_or(ctx.config.reference_price_fallback)
    };
    let discounted = |reference: f64, discount: f64| reference * (1.0 - discount / 100.0);

    let (share_price, source, conversion) = match terms.conversion_terms()? {
        ConversionTerms::Cap(cap) => {
            let cap_price = cap_price_for(cap);
            let conversion = NoteConversion {
                cap_price: Some(cap_price),
                discount_price: None,
                reference_price: None,
            };
            (cap_price, PriceSource::ValuationCap, conversion)
        }
        ConversionTerms::Discount(discount) => {
            let reference = reference_for(None);
            let discount_price = discounted(reference, discount);
            let conversion = NoteConversion {
                cap_price: None,
                discount_price: Some(discount_price),
                reference_price: Some(reference),
            };
            (discount_price, PriceSource::Discount, conversion)
        }
        ConversionTerms::CapAndDiscount {
            cap,
            discount_percent,
        } => {
            let cap_price = cap_price_for(cap);
            let reference = reference_for(Some(cap_price));
            let discount_price = discounted(reference, discount_percent);
            let conversion = NoteConversion {
                cap_price: Some(cap_price),
                discount_price: Some(discount_price),
                reference_price: Some(reference),
            };
            if discount_price < cap_price {
                (discount_price, PriceSource::Discount, conversion)
            } else {
                (cap_price, PriceSource::ValuationCap, conversion)
            }
        }
    };

    Ok(Pricing {
        share_price,
        source,
        pre_money: Money::for_shares(shares, share_price),
        conversion: Some(conversion),
    })
}

// =============================================================================
// Step 5: Post-Money Pool
// =============================================================================

/// Issues new pool shares so the pool equals `target%` of the final total.
///
/// No other holder's share count changes; the dilution shows up in step 6.
fn apply_post_money_pool(state: &mut OwnershipState, resize: &PoolResize) -> CoreResult<()> {
    if resize.target_percent <= state.pool_percent_of_total() {
        trace!(target_percent = resize.target_percent, "Post-money pool already at target");
        return Ok(());
    }

    let t = resize.target_percent / 100.0;
    let non_pool = state.total_shares - state.pool.shares;
    let pool_after = shares_to_issue("pool shares", t * non_pool as f64 / (1.0 - t), non_pool)?;

    if pool_after > state.pool.shares {
        state.total_shares = add_shares("total shares", non_pool, pool_after)?;
        state.pool.shares = pool_after;
        state.pool.last_resize = Some(PoolTiming::PostMoney);
    }
    trace!(target_percent = resize.target_percent, pool_after, "Post-money pool resized");
    Ok(())
}

// =============================================================================
// Share Count Arithmetic
// =============================================================================

/// Rounds a computed share count, failing when it can't be added to
/// `existing` without leaving the `u64` range.
fn shares_to_issue(field: &str, exact: f64, existing: u64) -> Result<u64, ValidationError> {
    let rounded = exact.round();
    let headroom = (u64::MAX - existing) as f64;
    if !rounded.is_finite() || rounded < 0.0 || rounded >= headroom {
        return Err(ValidationError::ShareCountOverflow {
            field: field.to_string(),
        });
    }
    Ok(rounded as u64)
}

fn add_shares(field: &str, a: u64, b: u64) -> Result<u64, ValidationError> {
    a.checked_add(b).ok_or_else(|| ValidationError::ShareCountOverflow {
        field: field.to_string(),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::initializer::initialize;
    use crate::types::{FounderInput, PoolAllocation};

    fn solo_founder(config: &ModelConfig) -> OwnershipState {
        initialize(&[FounderInput::new("Ada", 100.0)], &[], config).unwrap()
    }

    fn assert_conserved(state: &OwnershipState) {
        assert_eq!(state.allocated_shares(), state.total_shares);
        assert!((state.percent_sum() - 100.0).abs() < 0.011, "sum = {}", state.percent_sum());
    }

    #[test]
    fn test_priced_round_pre_money() {
        let config = ModelConfig::default();
        let state = solo_founder(&config);
        let event = FinancingEvent::priced_pre_money(
            "Seed",
            Money::from_major(1_000_000),
            Money::from_major(4_000_000),
        );

        let outcome = apply_round(&state, &event, &RoundContext::new(&config)).unwrap();

        assert!((outcome.share_price - 0.40).abs() < 1e-12);
        assert_eq!(outcome.price_source, PriceSource::PreMoneyValuation);
        assert_eq!(outcome.new_shares_issued, 2_500_000);
        assert_eq!(outcome.pre_money_valuation, Money::from_major(4_000_000));
        assert_eq!(outcome.post_money_valuation, Money::from_major(5_000_000));

        let next = &outcome.next_state;
        assert_eq!(next.total_shares, 12_500_000);
        assert_eq!(next.founders[0].ownership_percent, 80.0);
        assert_eq!(next.investors[0].ownership_percent, 20.0);
        assert_eq!(next.investors[0].investment_amount, Money::from_major(1_000_000));
        assert_eq!(next.investors[0].kind, InvestorKind::Primary);
        assert_eq!(next.investors[0].event_id, event.id);
        assert_conserved(next);

        // Prior state untouched.
        assert_eq!(state.total_shares, 10_000_000);
        assert!(state.investors.is_empty());
    }

    #[test]
    fn test_priced_round_post_money() {
        let config = ModelConfig::default();
        let state = solo_founder(&config);
        let event = FinancingEvent::new(
            "Seed",
            EventTerms::PricedRound(PricedRoundTerms {
                capital_raised: Money::from_major(1_000_000),
                pre_money_valuation: None,
                post_money_valuation: Some(Money::from_major(5_000_000)),
                secondary_sale: None,
                pool_resize: None,
            }),
        );

        let outcome = apply_round(&state, &event, &RoundContext::new(&config)).unwrap();
        assert_eq!(outcome.price_source, PriceSource::PostMoneyValuation);
        assert_eq!(outcome.new_shares_issued, 2_500_000);
        assert_eq!(outcome.pre_money_valuation, Money::from_major(4_000_000));
        assert!(outcome.is_priced_round());
    }

    #[test]
    fn test_note_cap_only() {
        let config = ModelConfig::default();
        let state = solo_founder(&config);
        let event = FinancingEvent::convertible_note(
            "SAFE",
            Money::from_major(500_000),
            Some(Money::from_major(5_000_000)),
            None,
        );

        let outcome = apply_round(&state, &event, &RoundContext::new(&config)).unwrap();
        assert!((outcome.share_price - 0.50).abs() < 1e-12);
        assert_eq!(outcome.price_source, PriceSource::ValuationCap);
        assert_eq!(outcome.new_shares_issued, 1_000_000);
        assert_eq!(outcome.next_state.total_shares, 11_000_000);
        assert_eq!(outcome.next_state.founders[0].ownership_percent, 90.91);
        assert_eq!(outcome.next_state.investors[0].ownership_percent, 9.09);
        assert!(!outcome.is_priced_round());
    }

    #[test]
    fn test_note_picks_lower_of_cap_and_discount() {
        let config = ModelConfig::default();
        let state = solo_founder(&config);
        let event = FinancingEvent::convertible_note(
            "SAFE",
            Money::from_major(300_000),
            Some(Money::from_major(6_000_000)),
            Some(25.0),
        );

        let outcome = apply_round(&state, &event, &RoundContext::new(&config)).unwrap();
        let conversion = outcome.conversion.unwrap();

        assert!((conversion.cap_price.unwrap() - 0.60).abs() < 1e-12);
        assert!((conversion.discount_price.unwrap() - 0.45).abs() < 1e-12);
        assert!((outcome.share_price - 0.45).abs() < 1e-12);
        assert_eq!(outcome.price_source, PriceSource::Discount);
        assert_eq!(outcome.new_shares_issued, 666_667);
        assert_eq!(outcome.next_state.total_shares, 10_666_667);
    }

    #[test]
    fn test_note_discount_uses_last_priced_round() {
        let config = ModelConfig::default();
        let state = solo_founder(&config);
        let event = FinancingEvent::convertible_note(
            "SAFE",
            Money::from_major(100_000),
            Some(Money::from_major(10_000_000)),
            Some(20.0),
        );
        let ctx = RoundContext::new(&config).with_last_priced_share_price(Some(2.0));

        let outcome = apply_round(&state, &event, &ctx).unwrap();
        // Discount price 1.60 > cap price 1.00: cap wins.
        assert!((outcome.share_price - 1.0).abs() < 1e-12);
        assert_eq!(outcome.price_source, PriceSource::ValuationCap);
        assert_eq!(outcome.conversion.unwrap().reference_price, Some(2.0));
    }

    #[test]
    fn test_note_discount_only_uses_configured_fallback() {
        let config = ModelConfig {
            reference_price_fallback: 0.5,
            ..ModelConfig::default()
        };
        let state = solo_founder(&config);
        let event = FinancingEvent::convertible_note("SAFE", Money::from_major(100_000), None, Some(20.0));

        let outcome = apply_round(&state, &event, &RoundContext::new(&config)).unwrap();
        assert!((outcome.share_price - 0.4).abs() < 1e-12);
        assert_eq!(outcome.new_shares_issued, 250_000);
    }

    #[test]
    fn test_note_without_terms_fails_before_mutation() {
        let config = ModelConfig::default();
        let state = solo_founder(&config);
        let event = FinancingEvent::convertible_note("SAFE", Money::from_major(100_000), None, None);

        let err = apply_round(&state, &event, &RoundContext::new(&config)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidTerms { .. }));
    }

    #[test]
    fn test_secondary_rider_runs_first_and_keeps_total() {
        let config = ModelConfig::default();
        let state = solo_founder(&config);
        let founder_id = state.founders[0].id.clone();
        let event = FinancingEvent::priced_pre_money(
            "Series A",
            Money::from_major(2_000_000),
            Money::from_major(8_000_000),
        )
        .with_secondary_sale(SecondarySale {
            founder_id,
            buyer_name: "Angel".to_string(),
            shares_sold: 500_000,
            price_per_share: 0.7,
        });

        let outcome = apply_round(&state, &event, &RoundContext::new(&config)).unwrap();
        let next = &outcome.next_state;

        assert_eq!(next.founders[0].shares, 9_500_000);
        assert_eq!(next.investors.len(), 2);
        assert_eq!(next.investors[0].kind, InvestorKind::Secondary);
        assert_eq!(next.investors[0].shares, 500_000);
        assert_eq!(next.investors[0].investment_amount, Money::from_major(350_000));
        // Price still uses the full pre-raise count (secondary creates no shares).
        assert!((outcome.share_price - 0.8).abs() < 1e-12);
        assert_eq!(outcome.new_shares_issued, 2_500_000);
        assert_conserved(next);
    }

    #[test]
    fn test_secondary_is_clamped_to_holding() {
        let config = ModelConfig::default();
        let state = solo_founder(&config);
        let event = FinancingEvent::new(
            "Founder liquidity",
            EventTerms::Secondary(SecondarySale {
                founder_id: state.founders[0].id.clone(),
                buyer_name: "Fund".to_string(),
                shares_sold: 20_000_000,
                price_per_share: 1.0,
            }),
        );

        let outcome = apply_round(&state, &event, &RoundContext::new(&config)).unwrap();
        let next = &outcome.next_state;
        assert_eq!(next.founders[0].shares, 0);
        assert_eq!(next.investors[0].shares, 10_000_000);
        assert_eq!(next.total_shares, 10_000_000);
        assert_eq!(outcome.price_source, PriceSource::SecondarySale);
        assert_eq!(outcome.new_shares_issued, 0);
        assert_eq!(outcome.pre_money_valuation, outcome.post_money_valuation);
        assert_conserved(next);
    }

    #[test]
    fn test_pre_money_pool_dilutes_founders_only() {
        let config = ModelConfig::default();
        let state = initialize(
            &[FounderInput::new("Ada", 80.0), FounderInput::new("Grace", 20.0)],
            &[],
            &config,
        )
        .unwrap();
        let event = FinancingEvent::priced_pre_money(
            "Seed",
            Money::from_major(1_000_000),
            Money::from_major(4_000_000),
        )
        .with_pool_resize(PoolResize {
            target_percent: 10.0,
            timing: PoolTiming::PreMoney,
        });

        let outcome = apply_round(&state, &event, &RoundContext::new(&config)).unwrap();
        let next = &outcome.next_state;

        assert_eq!(next.founders[0].shares, 7_200_000);
        assert_eq!(next.founders[1].shares, 1_800_000);
        assert_eq!(next.pool.shares, 1_000_000);
        assert_eq!(next.pool.last_resize, Some(PoolTiming::PreMoney));
        // Price is on the unchanged 10M count; the investor is not diluted.
        assert!((outcome.share_price - 0.4).abs() < 1e-12);
        assert_eq!(next.investors[0].ownership_percent, 20.0);
        assert_eq!(next.pool.ownership_percent, 8.0);
        assert_conserved(next);
    }

    #[test]
    fn test_pre_money_pool_never_shrinks() {
        let config = ModelConfig::default();
        let state = initialize(
            &[FounderInput::new("Ada", 80.0)],
            &[PoolAllocation::new("ESOP", 20.0)],
            &config,
        )
        .unwrap();
        let event = FinancingEvent::new(
            "Pool refresh",
            EventTerms::PoolResize(PoolResize {
                target_percent: 10.0,
                timing: PoolTiming::PreMoney,
            }),
        );

        let outcome = apply_round(&state, &event, &RoundContext::new(&config)).unwrap();
        assert_eq!(outcome.next_state.pool.shares, 2_000_000);
        assert_eq!(outcome.next_state.founders[0].shares, 8_000_000);
        assert_eq!(outcome.price_source, PriceSource::Unpriced);
        assert_eq!(outcome.share_price, 0.0);
    }

    #[test]
    fn test_pre_money_pool_unreachable_without_founders() {
        let config = ModelConfig::default();
        let mut state = solo_founder(&config);
        // Founder sold everything to an investor.
        let sale = FinancingEvent::new(
            "Exit",
            EventTerms::Secondary(SecondarySale {
                founder_id: state.founders[0].id.clone(),
                buyer_name: "Buyer".to_string(),
                shares_sold: 10_000_000,
                price_per_share: 1.0,
            }),
        );
        state = apply_round(&state, &sale, &RoundContext::new(&config))
            .unwrap()
            .next_state;

        let event = FinancingEvent::new(
            "Pool",
            EventTerms::PoolResize(PoolResize {
                target_percent: 10.0,
                timing: PoolTiming::PreMoney,
            }),
        );
        let err = apply_round(&state, &event, &RoundContext::new(&config)).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::PoolTargetUnreachable { .. })
        ));
    }

    #[test]
    fn test_post_money_pool_hits_target_of_final_total() {
        let config = ModelConfig::default();
        let state = solo_founder(&config);
        let event = FinancingEvent::priced_pre_money(
            "Series A",
            Money::from_major(2_500_000),
            Money::from_major(10_000_000),
        )
        .with_pool_resize(PoolResize {
            target_percent: 15.0,
            timing: PoolTiming::PostMoney,
        });

        let outcome = apply_round(&state, &event, &RoundContext::new(&config)).unwrap();
        let next = &outcome.next_state;

        assert_eq!(outcome.new_shares_issued, 2_500_000);
        // Non-pool = 12.5M, pool = round(0.15 × 12.5M / 0.85).
        assert_eq!(next.pool.shares, 2_205_882);
        assert_eq!(next.total_shares, 12_500_000 + 2_205_882);
        assert_eq!(next.pool.ownership_percent, 15.0);
        assert_eq!(next.founders[0].shares, 10_000_000);
        assert_eq!(next.pool.last_resize, Some(PoolTiming::PostMoney));
        assert_conserved(next);
    }

    #[test]
    fn test_rejects_non_positive_capital() {
        let config = ModelConfig::default();
        let state = solo_founder(&config);
        let event = FinancingEvent::priced_pre_money("Seed", Money::from_major(-5), Money::from_major(4_000_000));
        let err = apply_round(&state, &event, &RoundContext::new(&config)).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_apportion_is_exact() {
        assert_eq!(apportion(&[8_000_000, 2_000_000], 9_000_000), vec![7_200_000, 1_800_000]);
        assert_eq!(apportion(&[1, 1, 1], 2), vec![1, 1, 0]);
        assert_eq!(apportion(&[0, 0], 5), vec![0, 0]);

        let parts = apportion(&[3_333_333, 3_333_333, 3_333_334], 8_999_999);
        assert_eq!(parts.iter().sum::<u64>(), 8_999_999);
    }

    #[test]
    fn test_share_overflow_is_a_validation_error() {
        let config = ModelConfig::default();
        let state = solo_founder(&config);
        // A 1-cent cap on a $100B raise prices shares far below a cent.
        let event = FinancingEvent::convertible_note(
            "SAFE",
            Money::from_major(100_000_000_000),
            Some(Money::from_cents(1)),
            None,
        );

        let err = apply_round(&state, &event, &RoundContext::new(&config)).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::ShareCountOverflow { .. })
        ));
    }

    #[test]
    fn test_share_count_arithmetic_rejects_overflow() {
        assert_eq!(shares_to_issue("pool shares", 1_500.4, 10).unwrap(), 1_500);
        assert!(shares_to_issue("pool shares", f64::INFINITY, 0).is_err());
        assert!(shares_to_issue("pool shares", 1e20, 0).is_err());
        assert!(shares_to_issue("pool shares", 10.0, u64::MAX - 5).is_err());

        assert_eq!(add_shares("total shares", 2, 3).unwrap(), 5);
        assert!(matches!(
            add_shares("total shares", u64::MAX, 1),
            Err(ValidationError::ShareCountOverflow { .. })
        ));
    }
}
