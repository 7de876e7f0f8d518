//! Shared state for the API layer.

use std::sync::Arc;

use crate::config::Config;
use crate::inference::Diagnose;
use crate::narrative::GenerateNarrative;

/// Shared context for all routes.
///
/// Built once at startup and immutable afterwards: configuration plus the
/// two external seams (classification, narrative generation) injected as
/// trait objects so tests can substitute mocks.
#[derive(Clone)]
pub struct ApiContext {
    pub config: Arc<Config>,
    pub diagnoser: Arc<dyn Diagnose>,
    pub narrator: Arc<dyn GenerateNarrative>,
}

impl ApiContext {
    pub fn new(
        config: Arc<Config>,
        diagnoser: Arc<dyn Diagnose>,
        narrator: Arc<dyn GenerateNarrative>,
    ) -> Self {
        Self {
            config,
            diagnoser,
            narrator,
        }
    }
}
