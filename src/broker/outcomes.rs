// Operation Outcome Registry
//
// Canned errors, async flags, operation tokens and response fields that a test
// harness configures before driving the engine. The engine only ever reads from it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::errors::BrokerError;
use super::types::{LastOperationState, VolumeMount};

/// Lifecycle operations the registry can be configured for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Catalog,
    Provision,
    Update,
    Deprovision,
    Bind,
    Unbind,
    GetInstance,
    GetBinding,
    LastOperation,
    LastBindingOperation,
}

impl OperationKind {
    pub const ALL: [OperationKind; 10] = [
        OperationKind::Catalog,
        OperationKind::Provision,
        OperationKind::Update,
        OperationKind::Deprovision,
        OperationKind::Bind,
        OperationKind::Unbind,
        OperationKind::GetInstance,
        OperationKind::GetBinding,
        OperationKind::LastOperation,
        OperationKind::LastBindingOperation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Catalog => "catalog",
            OperationKind::Provision => "provision",
            OperationKind::Update => "update",
            OperationKind::Deprovision => "deprovision",
            OperationKind::Bind => "bind",
            OperationKind::Unbind => "unbind",
            OperationKind::GetInstance => "get_instance",
            OperationKind::GetBinding => "get_binding",
            OperationKind::LastOperation => "last_operation",
            OperationKind::LastBindingOperation => "last_binding_operation",
        }
    }
}

/// Per-operation override read once per invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationOutcome {
    /// Error returned instead of the normal result
    pub error: Option<BrokerError>,
    /// Async flag for operations whose mode lets the registry decide it
    pub is_async: bool,
    /// Token returned alongside an async result
    pub operation_data: Option<String>,
}

impl OperationOutcome {
    /// Token to hand back when the response is async
    pub fn token_if(&self, is_async: bool) -> Option<String> {
        if is_async {
            self.operation_data.clone()
        } else {
            None
        }
    }
}

/// Response fields shared across operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseFields {
    pub dashboard_url: Option<String>,
    pub syslog_drain_url: Option<String>,
    pub route_service_url: Option<String>,
    /// When set, binds return only this URL instead of credentials
    pub backup_agent_url: Option<String>,
    pub volume_mounts: Vec<VolumeMount>,
    /// Service ID reported by instance fetches
    pub service_id: String,
    /// Plan ID reported by instance fetches
    pub plan_id: String,
    pub last_operation_state: LastOperationState,
    pub last_operation_description: String,
}

impl Default for ResponseFields {
    fn default() -> Self {
        Self {
            dashboard_url: None,
            syslog_drain_url: None,
            route_service_url: None,
            backup_agent_url: None,
            volume_mounts: Vec::new(),
            service_id: super::catalog::SERVICE_ID.to_string(),
            plan_id: super::catalog::SYSTEM_ADMIN_PLAN_ID.to_string(),
            last_operation_state: LastOperationState::Succeeded,
            last_operation_description: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct OperationOutcomes {
    overrides: HashMap<OperationKind, OperationOutcome>,
    pub fields: ResponseFields,
}

impl OperationOutcomes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the outcome configured for `kind`
    pub fn outcome(&self, kind: OperationKind) -> OperationOutcome {
        self.overrides.get(&kind).cloned().unwrap_or_default()
    }

    pub fn error(&self, kind: OperationKind) -> Option<BrokerError> {
        self.overrides.get(&kind).and_then(|o| o.error.clone())
    }

    pub fn set(&mut self, kind: OperationKind, outcome: OperationOutcome) {
        self.overrides.insert(kind, outcome);
    }

    pub fn fail(&mut self, kind: OperationKind, error: BrokerError) {
        self.overrides.entry(kind).or_default().error = Some(error);
    }

    pub fn clear_error(&mut self, kind: OperationKind) {
        if let Some(outcome) = self.overrides.get_mut(&kind) {
            outcome.error = None;
        }
    }

    pub fn set_async(&mut self, kind: OperationKind, is_async: bool) {
        self.overrides.entry(kind).or_default().is_async = is_async;
    }

    pub fn set_operation_data(&mut self, kind: OperationKind, token: impl Into<String>) {
        self.overrides.entry(kind).or_default().operation_data = Some(token.into());
    }

    /// Drop every override and restore default response fields
    pub fn reset(&mut self) {
        self.overrides.clear();
        self.fields = ResponseFields::default();
    }
}
