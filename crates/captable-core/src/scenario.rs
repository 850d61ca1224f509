//! # Scenario
//!
//! The persisted form of a cap table model, and the fold that turns it into
//! a timeline of ownership states.
//!
//! ## Document Shape
//! ```json
//! {
//!   "id": "…uuid…",
//!   "name": "Seed to Series A",
//!   "founders": [{ "id": "…", "name": "Ada", "initialEquityPercent": 90.0 }],
//!   "poolAllocations": [{ "id": "…", "name": "ESOP", "percent": 10.0 }],
//!   "events": [{ "id": "…", "name": "Seed", "terms": { "type": "pricedRound", … } }],
//!   "createdAt": "2026-01-01T00:00:00Z",
//!   "updatedAt": "2026-01-01T00:00:00Z"
//! }
//! ```
//!
//! ## Fold
//! ```text
//! initialize(founders, pool) ──► S0
//!        S0 ──apply_round(e1)──► S1 ──apply_round(e2)──► S2 ── … ──► Sn
//! ```
//! The fold is always re-run from scratch; editing an event means editing
//! the document and folding again.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;
use uuid::Uuid;

use crate::config::ModelConfig;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::event::FinancingEvent;
use crate::initializer::initialize;
use crate::round::{apply_round, RoundContext, RoundOutcome};
use crate::types::{FounderInput, OwnershipState, PoolAllocation};
use crate::validation::{validate_name, validate_uuid, ValidationResult};

// =============================================================================
// Scenario Document
// =============================================================================

/// A saved cap table model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Scenario {
    pub id: String,
    pub name: String,
    pub founders: Vec<FounderInput>,
    #[serde(default)]
    pub pool_allocations: Vec<PoolAllocation>,
    #[serde(default)]
    pub events: Vec<FinancingEvent>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Scenario {
    /// Creates a scenario with no events.
    pub fn new(
        name: impl Into<String>,
        founders: Vec<FounderInput>,
        pool_allocations: Vec<PoolAllocation>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            founders,
            pool_allocations,
            events: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Parses a scenario document.
    pub fn from_json(json: &str) -> CoreResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes the scenario document (pretty-printed).
    pub fn to_json(&self) -> CoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    fn check_index(&self, index: usize) -> ValidationResult<()> {
        if index >= self.events.len() {
            return Err(ValidationError::EventIndexOutOfBounds {
                index,
                len: self.events.len(),
            });
        }
        Ok(())
    }

    /// Appends an event to the end of the timeline.
    pub fn add_event(&mut self, event: FinancingEvent) {
        self.events.push(event);
        self.touch();
    }

    /// Replaces the event at `index`.
    pub fn replace_event(&mut self, index: usize, event: FinancingEvent) -> ValidationResult<()> {
        self.check_index(index)?;
        self.events[index] = event;
        self.touch();
        Ok(())
    }

    /// Removes and returns the event at `index`.
    pub fn remove_event(&mut self, index: usize) -> ValidationResult<FinancingEvent> {
        self.check_index(index)?;
        let removed = self.events.remove(index);
        self.touch();
        Ok(removed)
    }

    /// Moves the event at `from` so it ends up at position `to`.
    pub fn move_event(&mut self, from: usize, to: usize) -> ValidationResult<()> {
        self.check_index(from)?;
        self.check_index(to)?;
        let event = self.events.remove(from);
        self.events.insert(to, event);
        self.touch();
        Ok(())
    }

    /// Document-level checks (events are checked while folding).
    pub fn validate(&self) -> ValidationResult<()> {
        validate_uuid(&self.id)?;
        validate_name("scenario name", &self.name)?;
        Ok(())
    }

    /// Validates the document and folds every event.
    pub fn run(&self, config: &ModelConfig) -> CoreResult<Timeline> {
        self.validate()?;
        run_timeline(&self.founders, &self.pool_allocations, &self.events, config)
    }
}

// =============================================================================
// Timeline
// =============================================================================

/// One applied event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TimelineStep {
    #[ts(type = "number")]
    pub index: usize,
    pub event_id: String,
    pub event_name: String,
    pub outcome: RoundOutcome,
}

/// The initial state followed by one step per event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Timeline {
    pub initial: OwnershipState,
    pub steps: Vec<TimelineStep>,
}

impl Timeline {
    /// State after the last event (the initial state when there are none).
    pub fn final_state(&self) -> &OwnershipState {
        self.steps
            .last()
            .map_or(&self.initial, |step| &step.outcome.next_state)
    }

    /// Every state in order: initial, then one per event.
    pub fn states(&self) -> impl Iterator<Item = &OwnershipState> {
        std::iter::once(&self.initial).chain(self.steps.iter().map(|s| &s.outcome.next_state))
    }

    /// Number of states (events + 1).
    pub fn len(&self) -> usize {
        self.steps.len() + 1
    }

    /// Never true: a timeline always holds the initial state.
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Folds `events` over the initial state built from the allocations.
///
/// A failing event is reported as [`CoreError::EventFailed`] with its
/// position; nothing after it is applied.
///
/// ## Example
/// ```rust
/// use captable_core::{run_timeline, FinancingEvent, FounderInput, ModelConfig, Money};
///
/// let founders = vec![FounderInput::new("Ada", 100.0)];
/// let events = vec![
///     FinancingEvent::convertible_note("SAFE", Money::from_major(500_000), Some(Money::from_major(5_000_000)), None),
///     FinancingEvent::priced_pre_money("Seed", Money::from_major(2_000_000), Money::from_major(8_000_000)),
/// ];
///
/// let timeline = run_timeline(&founders, &[], &events, &ModelConfig::default()).unwrap();
/// assert_eq!(timeline.len(), 3);
/// assert_eq!(timeline.final_state().investors.len(), 2);
/// ```
pub fn run_timeline(
    founders: &[FounderInput],
    pool_allocations: &[PoolAllocation],
    events: &[FinancingEvent],
    config: &ModelConfig,
) -> CoreResult<Timeline> {
    let initial = initialize(founders, pool_allocations, config)?;
    let mut steps: Vec<TimelineStep> = Vec::with_capacity(events.len());
    let mut ctx = RoundContext::new(config);

    for (index, event) in events.iter().enumerate() {
        let current = steps
            .last()
            .map_or(&initial, |step| &step.outcome.next_state);

        let outcome = apply_round(current, event, &ctx).map_err(|source| CoreError::EventFailed {
            index,
            name: event.name.clone(),
            source: Box::new(source),
        })?;

        if outcome.is_priced_round() {
            ctx = ctx.with_last_priced_share_price(Some(outcome.share_price));
        }

        steps.push(TimelineStep {
            index,
            event_id: event.id.clone(),
            event_name: event.name.clone(),
            outcome,
        });
    }

    debug!(
        events = steps.len(),
        total_shares = steps
            .last()
            .map_or(initial.total_shares, |s| s.outcome.next_state.total_shares),
        "Folded scenario timeline"
    );

    Ok(Timeline { initial, steps })
}

// =============================================================================
// Unit Tests
// =============================================================================
