//! # captable-core: Pure Dilution Math for Startup Cap Tables
//!
//! This crate is the **heart** of the cap table engine. It turns founder
//! allocations and a sequence of financing events into ownership states,
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Cap Table Engine Architecture                      │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    captable CLI (apps/cli)                      │   │
//! │  │    load scenario.json ──► run / validate / exit ──► report     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ captable-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌────────────┐  ┌────────────┐  ┌────────────┐  ┌─────────┐  │   │
//! │  │   │initializer │─►│   round    │─►│ reconcile  │  │  exit   │  │   │
//! │  │   │ S0 from %  │  │ apply one  │  │ 2dp + 100% │  │ payouts │  │   │
//! │  │   └────────────┘  │   event    │  └────────────┘  └─────────┘  │   │
//! │  │                   └────────────┘                               │   │
//! │  │   scenario: document + fold  •  types / event / money         │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Ownership state and stakeholder holdings
//! - [`event`] - Financing events (priced rounds, notes, pool resizes, secondaries)
//! - [`money`] - Money type with integer cents
//! - [`config`] - Model tunables (initial share count, tolerances)
//! - [`initializer`] - Initial state from founder and pool percentages
//! - [`round`] - The round engine: one event in, one new state out
//! - [`reconcile`] - Percent rounding and the 100% guarantee
//! - [`exit`] - Exit payouts
//! - [`scenario`] - Persisted scenario document and the event fold
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: every function is deterministic, inputs are never mutated
//! 2. **No I/O**: file and network access belong to the CLI
//! 3. **Integer Shares, Integer Money**: shares are `u64`, money is cents (`i64`);
//!    only prices and percentages are floating point
//! 4. **Explicit Errors**: all errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use captable_core::{initialize, apply_round, FinancingEvent, FounderInput, ModelConfig, Money, RoundContext};
//!
//! let config = ModelConfig::default();
//! let state = initialize(&[FounderInput::new("Ada", 100.0)], &[], &config).unwrap();
//!
//! // $1M on a $9M pre-money: investor ends with 10%.
//! let seed = FinancingEvent::priced_pre_money("Seed", Money::from_major(1_000_000), Money::from_major(9_000_000));
//! let outcome = apply_round(&state, &seed, &RoundContext::new(&config)).unwrap();
//!
//! assert_eq!(outcome.next_state.investors[0].ownership_percent, 10.0);
//! assert_eq!(outcome.next_state.founders[0].ownership_percent, 90.0);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod event;
pub mod exit;
pub mod initializer;
pub mod money;
pub mod reconcile;
pub mod round;
pub mod scenario;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use captable_core::Money` instead of
// `use captable_core::money::Money`

pub use config::ModelConfig;
pub use error::{CoreError, CoreResult, ValidationError};
pub use event::{
    ConvertibleNoteTerms, EventTerms, FinancingEvent, PoolResize, PricedRoundTerms, SecondarySale,
};
pub use exit::{simulate_exit, ExitResult, FounderPayout, InvestorPayout};
pub use initializer::initialize;
pub use money::Money;
pub use round::{apply_round, NoteConversion, PriceSource, RoundContext, RoundOutcome};
pub use scenario::{run_timeline, Scenario, Timeline, TimelineStep};
pub use types::*;
