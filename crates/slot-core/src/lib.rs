//! # slot-core — Data model for the reel engine
//!
//! Shared types consumed by the outcome/payout engine and by presentation
//! layers: the symbol grid, symbol definitions with pay tables, payline
//! coordinate sets, and the immutable per-session game configuration.
//!
//! ## Architecture
//!
//! ```text
//! GameConfig
//!     │
//!     ├── GridSpec (reels × rows)
//!     ├── SymbolSet (pay tables, wild/scatter/bonus roles)
//!     ├── Vec<Payline> (scored coordinate paths)
//!     └── trigger/award tables (scatter → free spins, bonus run → picks)
//! ```
//!
//! Everything here is plain data: no RNG, no evaluation logic. The engine
//! crate layers outcome selection and board generation on top.

pub mod config;
pub mod grid;
pub mod paylines;
pub mod symbols;

pub use config::*;
pub use grid::*;
pub use paylines::*;
pub use symbols::*;
