// End-to-end lifecycle flows driven through the public broker API
// Each test plays the role of a boundary layer and then inspects the recorded calls

use fake_service_broker::broker::catalog::{SERVICE_ID, SYSTEM_ADMIN_PLAN_ID};
use fake_service_broker::broker::{
    BindDetails, DeprovisionDetails, LastOperationState, OperationKind, PollDetails,
    ProvisionDetails, UnbindDetails, UpdateDetails, ASYNC_BIND_OPERATION_DATA,
};
use fake_service_broker::{
    BrokerError, BrokerMode, FakeServiceBroker, InjectedFailure, RequestContext, ServiceBroker,
    SharedBroker,
};
use serde_json::json;

fn provision_details() -> ProvisionDetails {
    ProvisionDetails::new(SERVICE_ID, SYSTEM_ADMIN_PLAN_ID).with_parameters(json!({
        "cluster": "dev",
        "replicas": 3
    }))
}

#[test]
fn test_synchronous_full_lifecycle() {
    let mut broker = FakeServiceBroker::synchronous();
    let ctx = RequestContext::new();

    let catalog = broker.services(&ctx).unwrap();
    assert_eq!(catalog[0].name, "cdr-services");
    assert_eq!(catalog[0].plans.len(), 2);

    let provisioned = broker
        .provision(&ctx, "instance-1", provision_details(), false)
        .unwrap();
    assert!(!provisioned.is_async);
    assert!(!provisioned.already_exists);

    let binding = broker
        .bind(
            &ctx,
            "instance-1",
            "binding-1",
            BindDetails::new(SERVICE_ID, SYSTEM_ADMIN_PLAN_ID).with_app_guid("app-1"),
            false,
        )
        .unwrap();
    assert_eq!(binding.credentials.unwrap().password, "robin");

    broker
        .unbind(&ctx, "instance-1", "binding-1", UnbindDetails::default(), false)
        .unwrap();
    broker
        .deprovision(&ctx, "instance-1", DeprovisionDetails::default(), false)
        .unwrap();

    let calls = broker.calls();
    assert!(calls.broker_called);
    assert_eq!(calls.bound_instance_ids, vec!["instance-1".to_string()]);
    assert_eq!(
        calls.unbound_ids,
        vec![("instance-1".to_string(), "binding-1".to_string())]
    );
    assert_eq!(calls.deprovisioned_instance_ids, vec!["instance-1".to_string()]);
}

#[test]
fn test_parameter_key_order_does_not_break_idempotency() {
    let mut broker = FakeServiceBroker::synchronous();
    let ctx = RequestContext::new();

    let first: serde_json::Value = serde_json::from_str(r#"{"a":1,"b":{"c":2,"d":3}}"#).unwrap();
    let second: serde_json::Value = serde_json::from_str(r#"{"b":{"d":3,"c":2},"a":1}"#).unwrap();

    broker
        .provision(
            &ctx,
            "instance-1",
            ProvisionDetails::new(SERVICE_ID, SYSTEM_ADMIN_PLAN_ID).with_parameters(first),
            false,
        )
        .unwrap();
    let replay = broker
        .provision(
            &ctx,
            "instance-1",
            ProvisionDetails::new(SERVICE_ID, SYSTEM_ADMIN_PLAN_ID).with_parameters(second),
            false,
        )
        .unwrap();

    assert!(replay.already_exists);
}

#[test]
fn test_async_capable_provision_then_poll() {
    let mut broker = FakeServiceBroker::async_capable();
    let ctx = RequestContext::new();
    broker.outcomes_mut().set_async(OperationKind::Provision, true);
    broker
        .outcomes_mut()
        .set_operation_data(OperationKind::Provision, "provision-op");
    broker.outcomes_mut().fields.last_operation_state = LastOperationState::InProgress;

    let spec = broker
        .provision(&ctx, "instance-1", provision_details(), true)
        .unwrap();
    let token = spec.operation_data.unwrap();

    let poll = broker
        .last_operation(&ctx, "instance-1", PollDetails::for_operation(token.clone()))
        .unwrap();
    assert_eq!(poll.state, LastOperationState::InProgress);
    assert_eq!(broker.calls().last_operation_data(), Some(token.as_str()));

    broker.outcomes_mut().fields.last_operation_state = LastOperationState::Succeeded;
    let poll = broker
        .last_operation(&ctx, "instance-1", PollDetails::for_operation(token))
        .unwrap();
    assert_eq!(poll.state, LastOperationState::Succeeded);
}

#[test]
fn test_async_capable_binding_flow() {
    let mut broker = FakeServiceBroker::async_capable();
    let ctx = RequestContext::new();
    let details = BindDetails::new(SERVICE_ID, SYSTEM_ADMIN_PLAN_ID).with_app_guid("app-1");

    let accepted = broker
        .bind(&ctx, "instance-1", "binding-1", details.clone(), true)
        .unwrap();
    assert!(accepted.is_async);

    let poll = broker
        .last_binding_operation(
            &ctx,
            "instance-1",
            "binding-1",
            PollDetails::for_operation(accepted.operation_data.unwrap()),
        )
        .unwrap();
    assert_eq!(poll.state, LastOperationState::Succeeded);

    let record = broker.calls().last_binding_operation.clone().unwrap();
    assert_eq!(record.instance_id, "instance-1");
    assert_eq!(record.operation_data.as_deref(), Some(ASYNC_BIND_OPERATION_DATA));

    let fetched = broker
        .bind(&ctx, "instance-1", "binding-1", details, true)
        .unwrap();
    assert!(fetched.already_exists);
    assert_eq!(fetched.credentials.unwrap().username, "batman");
}

#[test]
fn test_async_only_rejects_synchronous_callers() {
    let mut broker = FakeServiceBroker::new(BrokerMode::AsyncOnly);
    let ctx = RequestContext::new();

    assert_eq!(
        broker.provision(&ctx, "instance-1", provision_details(), false),
        Err(BrokerError::AsyncRequired)
    );
    assert_eq!(
        broker.deprovision(&ctx, "instance-1", DeprovisionDetails::default(), false),
        Err(BrokerError::AsyncRequired)
    );

    broker
        .provision(&ctx, "instance-1", provision_details(), true)
        .unwrap();
    let deprovisioned = broker
        .deprovision(&ctx, "instance-1", DeprovisionDetails::default(), true)
        .unwrap();
    assert!(deprovisioned.is_async);
}

#[test]
fn test_injected_failure_carries_status_hint() {
    let mut broker = FakeServiceBroker::synchronous();
    let failure = InjectedFailure::new("quota exceeded")
        .with_status(422)
        .with_error_key("QuotaExceeded");
    broker
        .outcomes_mut()
        .fail(OperationKind::Update, failure.clone().into());

    let err = broker
        .update(
            &RequestContext::new(),
            "instance-1",
            UpdateDetails::default(),
            false,
        )
        .unwrap_err();

    assert!(err.is_injected());
    assert_eq!(err.to_string(), "quota exceeded");
    assert_eq!(err, BrokerError::Injected(failure));
}

#[test]
fn test_clearing_an_injected_error_restores_behavior() {
    let mut broker = FakeServiceBroker::synchronous();
    let ctx = RequestContext::new();
    broker
        .outcomes_mut()
        .fail(OperationKind::Provision, BrokerError::injected("down"));
    assert!(broker
        .provision(&ctx, "instance-1", provision_details(), false)
        .is_err());

    broker.outcomes_mut().clear_error(OperationKind::Provision);
    assert!(broker
        .provision(&ctx, "instance-1", provision_details(), false)
        .is_ok());
}

#[test]
fn test_shared_broker_clones_observe_the_same_state() {
    let shared = SharedBroker::new(FakeServiceBroker::synchronous().with_instance_limit(2));
    let other = shared.clone();
    let ctx = RequestContext::new().with_test_context(true);

    shared
        .provision(&ctx, "instance-1", provision_details(), false)
        .unwrap();
    let replay = other
        .provision(&ctx, "instance-1", provision_details(), false)
        .unwrap();
    assert!(replay.already_exists);

    let (stored, saw_context) =
        shared.inspect(|broker| (broker.instances().len(), broker.calls().received_context));
    assert_eq!(stored, 1);
    assert!(saw_context);
}
