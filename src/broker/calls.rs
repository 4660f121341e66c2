// Record of what the engine received, for test assertions

use super::types::{
    DeprovisionDetails, FetchBindingDetails, FetchInstanceDetails, UnbindDetails, UpdateDetails,
};

/// Identifiers a poller presented on its last poll
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollRecord {
    pub instance_id: String,
    pub binding_id: Option<String>,
    pub operation_data: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallLog {
    /// Set by every lifecycle operation except the poll operations
    pub broker_called: bool,
    /// Last `test_context` value seen on a request context
    pub received_context: bool,

    pub update_details: Option<UpdateDetails>,
    /// Async-allowed flag of the last update
    pub async_allowed: bool,
    pub deprovision_details: Option<DeprovisionDetails>,
    pub unbinding_details: Option<UnbindDetails>,
    pub instance_fetch_details: Option<FetchInstanceDetails>,
    pub binding_fetch_details: Option<FetchBindingDetails>,

    pub updated_instance_ids: Vec<String>,
    pub deprovisioned_instance_ids: Vec<String>,
    pub get_instance_ids: Vec<String>,
    pub bound_instance_ids: Vec<String>,
    /// `(instance_id, binding_id)` pairs seen by unbind
    pub unbound_ids: Vec<(String, String)>,
    /// `(instance_id, binding_id)` pairs seen by binding fetches
    pub get_binding_ids: Vec<(String, String)>,

    pub last_operation: Option<PollRecord>,
    pub last_binding_operation: Option<PollRecord>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn observe_context(&mut self, test_context: Option<bool>) {
        if let Some(value) = test_context {
            self.received_context = value;
        }
    }

    pub fn last_operation_instance_id(&self) -> Option<&str> {
        self.last_operation.as_ref().map(|p| p.instance_id.as_str())
    }

    pub fn last_operation_data(&self) -> Option<&str> {
        self.last_operation
            .as_ref()
            .and_then(|p| p.operation_data.as_deref())
    }
}
