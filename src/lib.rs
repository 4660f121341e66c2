// Fake Service Broker Library - Open Service Broker test double
// This exposes the lifecycle engine and its ambient setup for harnesses and boundary layers

pub mod broker;
pub mod config;
pub mod telemetry;

// Re-export key types for easy access
pub use broker::{
    BrokerError, BrokerMode, BrokerResult, CallLog, FakeServiceBroker, InjectedFailure,
    ModePolicy, OperationKind, OperationOutcome, OperationOutcomes, RequestContext,
    ServiceBroker, SharedBroker,
};
pub use config::{BrokerSettings, FakeBrokerConfig, ObservabilityConfig};
pub use telemetry::{create_operation_span, generate_correlation_id, init_telemetry};
