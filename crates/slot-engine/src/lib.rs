//! # slot-engine
//!
//! Outcome-first spin engine: each spin draws a weighted outcome category
//! first, then synthesizes a board that realizes it, then evaluates the
//! board for paid wins and feature triggers.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                        SlotSession                         │
//! │  ┌───────────┐   ┌────────────────┐   ┌─────────────────┐  │
//! │  │  outcome   │──▶│ BoardGenerator │──▶│  evaluate_wins  │  │
//! │  │  tables    │   │ (constrained,  │   │ check_bonus_    │  │
//! │  │ (weighted) │   │  validated)    │   │ triggers (pure) │  │
//! │  └───────────┘   └────────────────┘   └─────────────────┘  │
//! │        base / free_spins / pick_prizes        stats, state │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! The evaluator is a pure function of (config, grid, bet, multiplier); the
//! generator uses it as the validation oracle, so the two can never disagree
//! about what a board pays.

pub mod error;
pub mod evaluator;
pub mod generator;
pub mod outcome;
pub mod session;

pub use error::EngineError;
pub use evaluator::{
    check_bonus_triggers, evaluate_wins, longest_bonus_run, BonusTriggers, LineWin, WinResult,
    SCATTER_LINE,
};
pub use generator::{BoardGenerator, MAX_GENERATION_ATTEMPTS};
pub use outcome::{
    bust_weight, select_outcome, Outcome, OutcomeKind, OutcomeTables,
};
pub use session::{
    FreeSpinState, PickReveal, PickRound, SessionStats, SlotSession, SpinRecord,
};
