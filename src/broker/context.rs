// Request-scoped context handed to every broker operation

use crate::telemetry::generate_correlation_id;

/// Per-request data the boundary layer attaches to a call.
///
/// The two flags are out-of-band signals used only by tests: `test_context`
/// proves the context reached the engine, `fails` forces the catalog to error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub correlation_id: String,
    pub test_context: Option<bool>,
    pub fails: Option<bool>,
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestContext {
    pub fn new() -> Self {
        Self {
            correlation_id: generate_correlation_id(),
            test_context: None,
            fails: None,
        }
    }

    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = correlation_id.into();
        self
    }

    pub fn with_test_context(mut self, value: bool) -> Self {
        self.test_context = Some(value);
        self
    }

    pub fn failing(mut self) -> Self {
        self.fails = Some(true);
        self
    }

    pub fn should_fail(&self) -> bool {
        self.fails.unwrap_or(false)
    }
}
