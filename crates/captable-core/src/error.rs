//! # Error Types
//!
//! Domain-specific error types for captable-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  captable-core errors (this file)                                      │
//! │  ├── CoreError        - Round / scenario level failures                │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  CLI errors (apps/cli)                                                 │
//! │  └── ConfigError      - Configuration loading failures                 │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → anyhow (CLI) → stderr             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field, founder ID, event name)
//! 3. Errors are enum variants, never String
//! 4. Every error is raised BEFORE a new state is built, so a failed round
//!    never leaves a half-applied state behind

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core cap table errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Input failed a business rule (see [`ValidationError`]).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A convertible note carries terms that cannot produce a price.
    ///
    /// ## When This Occurs
    /// - Neither a valuation cap nor a discount is set
    ///
    /// ## User Workflow
    /// ```text
    /// Add SAFE: raise $500k, no cap, no discount
    ///      │
    ///      ▼
    /// apply_round()
    ///      │
    ///      ▼
    /// InvalidTerms { reason: "convertible note needs a valuation cap or a discount" }
    ///      │
    ///      ▼
    /// Editor blocks the edit and highlights the terms fields
    /// ```
    #[error("Invalid convertible note terms: {reason}")]
    InvalidTerms { reason: String },

    /// Exit valuation must be zero or positive.
    #[error("Exit valuation cannot be negative: {cents} cents")]
    InvalidExitValuation { cents: i64 },

    /// A scenario document could not be parsed.
    #[error("Invalid scenario document: {0}")]
    InvalidDocument(#[from] serde_json::Error),

    /// An event inside a scenario fold failed.
    ///
    /// Carries the position of the event so the editor can point at it.
    #[error("Event #{index} ({name}) failed: {source}")]
    EventFailed {
        index: usize,
        name: String,
        #[source]
        source: Box<CoreError>,
    },
}

impl CoreError {
    /// Returns the innermost error, unwrapping any `EventFailed` layers.
    pub fn root(&self) -> &CoreError {
        match self {
            CoreError::EventFailed { source, .. } => source.root(),
            other => other,
        }
    }

    /// True when the root cause is an input validation failure.
    pub fn is_validation(&self) -> bool {
        matches!(self.root(), CoreError::Validation(_))
    }

    /// True when the root cause is an invalid convertible note term sheet.
    pub fn is_invalid_terms(&self) -> bool {
        matches!(self.root(), CoreError::InvalidTerms { .. })
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when scenario input doesn't meet requirements.
/// Used for early validation before any ownership math runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}, got {actual}")]
    OutOfRange {
        field: String,
        min: f64,
        max: f64,
        actual: f64,
    },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} cannot be negative")]
    Negative { field: String },

    /// Founder and pool allocations do not add up to 100%.
    #[error("Equity allocations must total 100% (±{tolerance}), got {total:.4}%")]
    AllocationMismatch { total: f64, tolerance: f64 },

    /// Too many entries in a collection.
    #[error("At most {max} {field} allowed, got {actual}")]
    TooMany {
        field: String,
        max: usize,
        actual: usize,
    },

    /// Two mutually exclusive fields were both set.
    #[error("{first} and {second} are mutually exclusive")]
    MutuallyExclusive { first: String, second: String },

    /// A secondary sale names a founder that does not exist.
    #[error("Founder not found: {0}")]
    UnknownFounder(String),

    /// Duplicate value (e.g., duplicate founder ID).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },

    /// Invalid format (e.g., invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// The requested pool size can't be reached by diluting founders alone.
    #[error("Pool target {target}% cannot be reached without diluting investors")]
    PoolTargetUnreachable { target: f64 },

    /// A share count would not fit in a `u64` (e.g. a 1-cent cap on a
    /// large raise).
    #[error("{field} would exceed the maximum share count")]
    ShareCountOverflow { field: String },

    /// Scenario event index does not exist.
    #[error("Event index {index} out of bounds (scenario has {len} events)")]
    EventIndexOutOfBounds { index: usize, len: usize },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
