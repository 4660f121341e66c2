// Broker Module - In-memory Open Service Broker test double
//
// Stores, outcome registry, mode policies and the lifecycle engine that ties
// them together behind the `ServiceBroker` trait.

pub mod calls;
pub mod catalog;
pub mod context;
pub mod engine;
pub mod errors;
pub mod mode;
pub mod outcomes;
pub mod shared;
pub mod store;
pub mod traits;
pub mod types;


pub use calls::{CallLog, PollRecord};
pub use context::RequestContext;
pub use engine::{FakeServiceBroker, ASYNC_BIND_OPERATION_DATA, CONTEXT_FAILURE_MESSAGE};
pub use errors::{BrokerError, BrokerResult, InjectedFailure};
pub use mode::{BindAsync, BrokerMode, DeprovisionAsync, ModePolicy, ProvisionAsync, Rebind};
pub use outcomes::{OperationKind, OperationOutcome, OperationOutcomes, ResponseFields};
pub use shared::SharedBroker;
pub use store::{BindingStore, DetailStore, Existing, InstanceStore};
pub use traits::ServiceBroker;
#[cfg(any(test, feature = "testing"))]
pub use traits::MockServiceBroker;
pub use types::*;
