//! Fixed-width text rendering of timelines and exit payouts.
//!
//! ```text
//! #1 Seed: $0.4000/share from pre-money valuation, 2,500,000 new shares
//!    pre-money $4,000,000.00, post-money $5,000,000.00
//!   Stakeholder                 Kind             Shares   Ownership
//!   Ada                         founder      10,000,000      80.00%
//!   Seed                        investor      2,500,000      20.00%
//!   Equity Pool                 pool                  0       0.00%
//!   Total                                    12,500,000     100.00%
//! ```

use std::fmt;

use captable_core::{ExitResult, InvestorKind, OwnershipState, PriceSource, StakeholderKind, Timeline, TimelineStep};

/// Formats an integer with `,` thousands separators.
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn kind_label(kind: StakeholderKind) -> &'static str {
    match kind {
        StakeholderKind::Founder => "founder",
        StakeholderKind::Investor => "investor",
        StakeholderKind::Pool => "pool",
    }
}

fn source_label(source: PriceSource) -> &'static str {
    match source {
        PriceSource::PreMoneyValuation => "pre-money valuation",
        PriceSource::PostMoneyValuation => "post-money valuation",
        PriceSource::ValuationCap => "valuation cap",
        PriceSource::Discount => "discount",
        PriceSource::SecondarySale => "secondary sale",
        PriceSource::Unpriced => "unpriced",
    }
}

// =============================================================================
// Ownership Table
// =============================================================================

/// One cap table as a fixed-width table.
pub struct StateTable<'a>(pub &'a OwnershipState);

impl fmt::Display for StateTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.0;
        writeln!(f, "  {:<26}  {:<10} {:>14} {:>11}", "Stakeholder", "Kind", "Shares", "Ownership")?;
        for holder in state.stakeholders() {
            writeln!(
                f,
                "  {:<26}  {:<10} {:>14} {:>10.2}%",
                holder.name,
                kind_label(holder.kind),
                group_thousands(holder.shares),
                holder.ownership_percent
            )?;
        }
        writeln!(
            f,
            "  {:<26}  {:<10} {:>14} {:>10.2}%",
            "Total",
            "",
            group_thousands(state.total_shares),
            state.percent_sum()
        )
    }
}

fn write_step_heading(f: &mut fmt::Formatter<'_>, step: &TimelineStep) -> fmt::Result {
    let outcome = &step.outcome;
    write!(f, "#{} {}: ", step.index + 1, step.event_name)?;

    if outcome.price_source == PriceSource::Unpriced {
        return writeln!(f, "pool resize, no new money");
    }

    writeln!(
        f,
        "${:.4}/share from {}, {} new shares",
        outcome.share_price,
        source_label(outcome.price_source),
        group_thousands(outcome.new_shares_issued)
    )?;
    writeln!(
        f,
        "   pre-money {}, post-money {}",
        outcome.pre_money_valuation, outcome.post_money_valuation
    )
}

/// Every state of a timeline, initial state first.
pub struct TimelineReport<'a>(pub &'a Timeline);

impl fmt::Display for TimelineReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let timeline = self.0;
        writeln!(f, "Initial cap table")?;
        write!(f, "{}", StateTable(&timeline.initial))?;

        for step in &timeline.steps {
            writeln!(f)?;
            write_step_heading(f, step)?;
            write!(f, "{}", StateTable(&step.outcome.next_state))?;
        }
        Ok(())
    }
}

// =============================================================================
// Exit Table
// =============================================================================

/// Exit payouts as a fixed-width table.
pub struct ExitReport<'a>(pub &'a ExitResult);

impl fmt::Display for ExitReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let exit = self.0;
        writeln!(f, "Exit at {}", exit.exit_valuation)?;
        writeln!(
            f,
            "  {:<26} {:>10} {:>20} {:>10}",
            "Stakeholder", "Ownership", "Payout", "Multiple"
        )?;

        for founder in &exit.founders {
            writeln!(
                f,
                "  {:<26} {:>9.2}% {:>20}",
                founder.name,
                founder.ownership_percent,
                founder.cash_return.to_string()
            )?;
        }
        for investor in &exit.investors {
            let name = match investor.kind {
                InvestorKind::Primary => investor.name.clone(),
                InvestorKind::Secondary => format!("{} (secondary)", investor.name),
            };
            writeln!(
                f,
                "  {:<26} {:>9.2}% {:>20} {:>9.2}x",
                name,
                investor.ownership_percent,
                investor.cash_return.to_string(),
                investor.multiple
            )?;
        }
        writeln!(f, "  {:<26} {:>10} {:>20}", "Equity Pool", "", exit.pool_value.to_string())?;
        writeln!(f, "  {:<26} {:>10} {:>20}", "Total", "", exit.total_distributed.to_string())
    }
}
