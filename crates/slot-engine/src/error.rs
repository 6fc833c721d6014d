//! Engine error taxonomy

use slot_core::ConfigError;
use thiserror::Error;

use crate::outcome::OutcomeKind;

/// Errors surfaced by outcome selection and board generation.
///
/// Generation never panics and never silently degrades: an outcome kind
/// without a board strategy is a configuration error reported to the caller,
/// so the presentation layer can decide its own fallback.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("outcome kind {0:?} has no board generation strategy")]
    NoStrategy(OutcomeKind),
    #[error("outcome table `{0}` is empty")]
    EmptyTable(&'static str),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
