// Lifecycle Engine - in-memory service broker state machine
//
// Evaluates every lifecycle verb against the instance and binding stores, the
// outcome registry and the mode policy fixed at construction.

use serde_json::json;
use tracing::{debug, info, warn};

use super::calls::{CallLog, PollRecord};
use super::catalog;
use super::context::RequestContext;
use super::errors::{BrokerError, BrokerResult};
use super::mode::{BindAsync, BrokerMode, DeprovisionAsync, ModePolicy, ProvisionAsync, Rebind};
use super::outcomes::{OperationKind, OperationOutcome, OperationOutcomes};
use super::store::{BindingStore, Existing, InstanceStore};
use super::traits::ServiceBroker;
use super::types::*;
use crate::config::BrokerSettings;
use crate::telemetry::create_operation_span;

/// Token returned when an async-capable broker accepts a bind asynchronously
pub const ASYNC_BIND_OPERATION_DATA: &str = "0xDEADBEEF";

/// Message of the error forced through the request context's `fails` signal
pub const CONTEXT_FAILURE_MESSAGE: &str = "something went wrong!";

#[derive(Debug, Clone)]
pub struct FakeServiceBroker {
    mode: BrokerMode,
    policy: ModePolicy,
    /// Maximum number of stored instances, `None` for unlimited
    instance_limit: Option<usize>,
    instances: InstanceStore,
    bindings: BindingStore,
    outcomes: OperationOutcomes,
    calls: CallLog,
}

impl Default for FakeServiceBroker {
    fn default() -> Self {
        Self::new(BrokerMode::default())
    }
}

impl FakeServiceBroker {
    pub fn new(mode: BrokerMode) -> Self {
        Self {
            mode,
            policy: mode.policy(),
            instance_limit: None,
            instances: InstanceStore::new(),
            bindings: BindingStore::new(),
            outcomes: OperationOutcomes::new(),
            calls: CallLog::new(),
        }
    }

    pub fn synchronous() -> Self {
        Self::new(BrokerMode::Synchronous)
    }

    pub fn async_capable() -> Self {
        Self::new(BrokerMode::AsyncCapable)
    }

    pub fn async_only() -> Self {
        Self::new(BrokerMode::AsyncOnly)
    }

    /// Build an engine whose profile and canned fields come from configuration
    pub fn from_settings(settings: &BrokerSettings) -> Self {
        let mut broker = Self::new(settings.mode);
        broker.instance_limit = settings.instance_limit;
        if settings.reject_rebind {
            broker.policy = broker.policy.with_rebind(Rebind::Reject);
        }

        let outcomes = &mut broker.outcomes;
        if let Some(token) = &settings.operation_data {
            for kind in [
                OperationKind::Provision,
                OperationKind::Update,
                OperationKind::Deprovision,
            ] {
                outcomes.set_operation_data(kind, token.clone());
            }
        }
        outcomes.set_async(OperationKind::Provision, settings.provision_async);
        outcomes.set_async(OperationKind::Update, settings.update_async);

        let fields = &mut outcomes.fields;
        fields.dashboard_url = settings.dashboard_url.clone();
        fields.syslog_drain_url = settings.syslog_drain_url.clone();
        fields.route_service_url = settings.route_service_url.clone();
        fields.backup_agent_url = settings.backup_agent_url.clone();
        if let Some(service_id) = &settings.service_id {
            fields.service_id = service_id.clone();
        }
        if let Some(plan_id) = &settings.plan_id {
            fields.plan_id = plan_id.clone();
        }
        fields.volume_mounts = settings.volume_mounts.clone();
        fields.last_operation_state = settings.last_operation_state;
        fields.last_operation_description = settings.last_operation_description.clone();

        info!(
            mode = ?broker.mode,
            instance_limit = ?broker.instance_limit,
            "Fake service broker configured"
        );
        broker
    }

    pub fn with_instance_limit(mut self, limit: usize) -> Self {
        self.instance_limit = Some(limit);
        self
    }

    pub fn with_policy(mut self, policy: ModePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn mode(&self) -> BrokerMode {
        self.mode
    }

    pub fn policy(&self) -> ModePolicy {
        self.policy
    }

    pub fn instance_limit(&self) -> Option<usize> {
        self.instance_limit
    }

    pub fn instances(&self) -> &InstanceStore {
        &self.instances
    }

    pub fn bindings(&self) -> &BindingStore {
        &self.bindings
    }

    pub fn outcomes(&self) -> &OperationOutcomes {
        &self.outcomes
    }

    pub fn outcomes_mut(&mut self) -> &mut OperationOutcomes {
        &mut self.outcomes
    }

    pub fn calls(&self) -> &CallLog {
        &self.calls
    }

    /// Forget every recorded call, keeping stores and outcomes
    pub fn clear_calls(&mut self) {
        self.calls = CallLog::new();
    }

    fn at_capacity(&self) -> bool {
        self.instance_limit
            .is_some_and(|limit| self.instances.len() >= limit)
    }

    /// Mark the call, note the context signal and read the configured outcome once
    fn begin(&mut self, ctx: &RequestContext, kind: OperationKind) -> OperationOutcome {
        self.calls.broker_called = true;
        self.calls.observe_context(ctx.test_context);
        self.outcomes.outcome(kind)
    }

    fn binding_response(&self) -> Binding {
        let fields = &self.outcomes.fields;
        if let Some(url) = &fields.backup_agent_url {
            return Binding {
                backup_agent_url: Some(url.clone()),
                ..Default::default()
            };
        }

        Binding {
            credentials: Some(Credentials::default()),
            syslog_drain_url: fields.syslog_drain_url.clone(),
            route_service_url: fields.route_service_url.clone(),
            volume_mounts: fields.volume_mounts.clone(),
            ..Default::default()
        }
    }

    fn bind_synchronously(
        &mut self,
        ctx: &RequestContext,
        instance_id: &str,
        binding_id: &str,
        details: BindDetails,
    ) -> BrokerResult<Binding> {
        let outcome = self.begin(ctx, OperationKind::Bind);
        let mut binding = self.binding_response();

        let existing = self.bindings.compare(binding_id, &details);
        if existing == Existing::Identical {
            debug!(binding_id = %binding_id, "Binding already exists with identical details");
            binding.already_exists = true;
            return Ok(binding);
        }

        if let Some(err) = outcome.error {
            return Err(rejected(OperationKind::Bind, err));
        }

        if existing == Existing::Different {
            if self.policy.rebind == Rebind::Reject {
                return Err(rejected(
                    OperationKind::Bind,
                    BrokerError::BindingAlreadyExists,
                ));
            }
            warn!(binding_id = %binding_id, "Overwriting binding with different details");
        }

        self.calls.bound_instance_ids.push(instance_id.to_string());
        self.bindings.insert(binding_id, details);
        info!(
            instance_id = %instance_id,
            binding_id = %binding_id,
            "Binding stored"
        );
        Ok(binding)
    }
}

fn rejected(kind: OperationKind, err: BrokerError) -> BrokerError {
    warn!(operation = kind.as_str(), error = %err, "Broker operation rejected");
    err
}

impl ServiceBroker for FakeServiceBroker {
    fn services(&mut self, ctx: &RequestContext) -> BrokerResult<Vec<Service>> {
        let _span = create_operation_span(OperationKind::Catalog, ctx, None, None).entered();
        let outcome = self.begin(ctx, OperationKind::Catalog);

        if ctx.should_fail() {
            return Err(rejected(
                OperationKind::Catalog,
                BrokerError::injected(CONTEXT_FAILURE_MESSAGE),
            ));
        }
        if let Some(err) = outcome.error {
            return Err(rejected(OperationKind::Catalog, err));
        }

        Ok(catalog::services())
    }

    fn provision(
        &mut self,
        ctx: &RequestContext,
        instance_id: &str,
        details: ProvisionDetails,
        async_allowed: bool,
    ) -> BrokerResult<ProvisionedServiceSpec> {
        let _span =
            create_operation_span(OperationKind::Provision, ctx, Some(instance_id), None).entered();
        let outcome = self.begin(ctx, OperationKind::Provision);

        if let Some(err) = outcome.error {
            return Err(rejected(OperationKind::Provision, err));
        }

        if self.at_capacity() {
            return Err(rejected(
                OperationKind::Provision,
                BrokerError::InstanceLimitReached,
            ));
        }

        let dashboard_url = self.outcomes.fields.dashboard_url.clone();
        match self.instances.compare(instance_id, &details) {
            Existing::Absent => {
                if self.policy.provision == ProvisionAsync::Required && !async_allowed {
                    return Err(rejected(OperationKind::Provision, BrokerError::AsyncRequired));
                }

                let is_async = match self.policy.provision {
                    ProvisionAsync::Never => false,
                    ProvisionAsync::Configured => outcome.is_async,
                    ProvisionAsync::Required => true,
                };
                self.instances.insert(instance_id, details);
                info!(
                    instance_id = %instance_id,
                    is_async,
                    instances = self.instances.len(),
                    "Instance provisioned"
                );

                Ok(ProvisionedServiceSpec {
                    is_async,
                    already_exists: false,
                    dashboard_url,
                    operation_data: outcome.token_if(is_async),
                })
            }
            Existing::Identical => {
                let is_async = match self.policy.provision {
                    ProvisionAsync::Never => false,
                    ProvisionAsync::Configured => outcome.is_async,
                    ProvisionAsync::Required => async_allowed,
                };
                debug!(instance_id = %instance_id, "Instance already exists with identical details");

                Ok(ProvisionedServiceSpec {
                    is_async,
                    already_exists: true,
                    dashboard_url,
                    operation_data: outcome.token_if(is_async),
                })
            }
            Existing::Different => Err(rejected(
                OperationKind::Provision,
                BrokerError::InstanceAlreadyExists,
            )),
        }
    }

    fn update(
        &mut self,
        ctx: &RequestContext,
        instance_id: &str,
        details: UpdateDetails,
        async_allowed: bool,
    ) -> BrokerResult<UpdateServiceSpec> {
        let _span =
            create_operation_span(OperationKind::Update, ctx, Some(instance_id), None).entered();
        let outcome = self.begin(ctx, OperationKind::Update);

        if let Some(err) = outcome.error {
            return Err(rejected(OperationKind::Update, err));
        }

        self.calls.update_details = Some(details);
        self.calls.updated_instance_ids.push(instance_id.to_string());
        self.calls.async_allowed = async_allowed;
        info!(instance_id = %instance_id, async_allowed, "Instance update recorded");

        Ok(UpdateServiceSpec {
            is_async: outcome.is_async,
            dashboard_url: self.outcomes.fields.dashboard_url.clone(),
            operation_data: outcome.token_if(outcome.is_async),
        })
    }

    fn deprovision(
        &mut self,
        ctx: &RequestContext,
        instance_id: &str,
        details: DeprovisionDetails,
        async_allowed: bool,
    ) -> BrokerResult<DeprovisionServiceSpec> {
        let _span = create_operation_span(OperationKind::Deprovision, ctx, Some(instance_id), None)
            .entered();
        let outcome = self.begin(ctx, OperationKind::Deprovision);

        if let Some(err) = outcome.error {
            return Err(rejected(OperationKind::Deprovision, err));
        }

        let policy = self.policy.deprovision;
        if policy == DeprovisionAsync::Required && !async_allowed {
            return Err(rejected(OperationKind::Deprovision, BrokerError::AsyncRequired));
        }

        self.calls.deprovision_details = Some(details);
        self.calls
            .deprovisioned_instance_ids
            .push(instance_id.to_string());

        let known = self.instances.contains(instance_id);
        match policy {
            DeprovisionAsync::Lenient => {
                info!(instance_id = %instance_id, known, "Instance deprovisioned");
                Ok(DeprovisionServiceSpec::default())
            }
            DeprovisionAsync::MirrorCaller | DeprovisionAsync::Required => {
                if !known {
                    return Err(rejected(
                        OperationKind::Deprovision,
                        BrokerError::InstanceDoesNotExist,
                    ));
                }

                let is_async = policy == DeprovisionAsync::Required || async_allowed;
                info!(instance_id = %instance_id, is_async, "Instance deprovisioned");
                Ok(DeprovisionServiceSpec {
                    is_async,
                    operation_data: outcome.token_if(is_async),
                })
            }
        }
    }

    fn get_instance(
        &mut self,
        ctx: &RequestContext,
        instance_id: &str,
        details: FetchInstanceDetails,
    ) -> BrokerResult<GetInstanceDetailsSpec> {
        let _span = create_operation_span(OperationKind::GetInstance, ctx, Some(instance_id), None)
            .entered();
        let outcome = self.begin(ctx, OperationKind::GetInstance);

        self.calls.instance_fetch_details = Some(details);
        self.calls.get_instance_ids.push(instance_id.to_string());
        debug!(instance_id = %instance_id, "Instance fetched");

        if let Some(err) = outcome.error {
            return Err(rejected(OperationKind::GetInstance, err));
        }

        let fields = &self.outcomes.fields;
        Ok(GetInstanceDetailsSpec {
            service_id: fields.service_id.clone(),
            plan_id: fields.plan_id.clone(),
            dashboard_url: fields.dashboard_url.clone(),
            parameters: json!({ "param1": "value1" }),
        })
    }

    fn bind(
        &mut self,
        ctx: &RequestContext,
        instance_id: &str,
        binding_id: &str,
        details: BindDetails,
        async_allowed: bool,
    ) -> BrokerResult<Binding> {
        let _span = create_operation_span(
            OperationKind::Bind,
            ctx,
            Some(instance_id),
            Some(binding_id),
        )
        .entered();

        let accept_async = self.policy.bind == BindAsync::AcceptFirst
            && async_allowed
            && !self.bindings.contains(binding_id);
        if !accept_async {
            return self.bind_synchronously(ctx, instance_id, binding_id, details);
        }

        self.calls.broker_called = true;
        self.calls.bound_instance_ids.push(instance_id.to_string());
        self.bindings.insert(binding_id, details);
        info!(
            instance_id = %instance_id,
            binding_id = %binding_id,
            "Binding accepted asynchronously"
        );

        Ok(Binding {
            is_async: true,
            operation_data: Some(ASYNC_BIND_OPERATION_DATA.to_string()),
            ..Default::default()
        })
    }

    fn unbind(
        &mut self,
        ctx: &RequestContext,
        instance_id: &str,
        binding_id: &str,
        details: UnbindDetails,
        _async_allowed: bool,
    ) -> BrokerResult<UnbindSpec> {
        let _span = create_operation_span(
            OperationKind::Unbind,
            ctx,
            Some(instance_id),
            Some(binding_id),
        )
        .entered();
        let outcome = self.begin(ctx, OperationKind::Unbind);

        if let Some(err) = outcome.error {
            return Err(rejected(OperationKind::Unbind, err));
        }

        self.calls.unbinding_details = Some(details);
        self.calls
            .unbound_ids
            .push((instance_id.to_string(), binding_id.to_string()));
        info!(
            instance_id = %instance_id,
            binding_id = %binding_id,
            known_instance = self.instances.contains(instance_id),
            known_binding = self.bindings.contains(binding_id),
            "Unbind recorded"
        );

        Ok(UnbindSpec::default())
    }

    fn get_binding(
        &mut self,
        ctx: &RequestContext,
        instance_id: &str,
        binding_id: &str,
        details: FetchBindingDetails,
    ) -> BrokerResult<GetBindingSpec> {
        let _span = create_operation_span(
            OperationKind::GetBinding,
            ctx,
            Some(instance_id),
            Some(binding_id),
        )
        .entered();
        let outcome = self.begin(ctx, OperationKind::GetBinding);

        self.calls.binding_fetch_details = Some(details);
        self.calls
            .get_binding_ids
            .push((instance_id.to_string(), binding_id.to_string()));
        debug!(binding_id = %binding_id, "Binding fetched");

        if let Some(err) = outcome.error {
            return Err(rejected(OperationKind::GetBinding, err));
        }

        let fields = &self.outcomes.fields;
        Ok(GetBindingSpec {
            credentials: Some(Credentials::default()),
            syslog_drain_url: fields.syslog_drain_url.clone(),
            route_service_url: fields.route_service_url.clone(),
            volume_mounts: fields.volume_mounts.clone(),
        })
    }

    fn last_operation(
        &mut self,
        ctx: &RequestContext,
        instance_id: &str,
        details: PollDetails,
    ) -> BrokerResult<LastOperation> {
        let _span =
            create_operation_span(OperationKind::LastOperation, ctx, Some(instance_id), None)
                .entered();

        self.calls.last_operation = Some(PollRecord {
            instance_id: instance_id.to_string(),
            binding_id: None,
            operation_data: details.operation_data,
        });
        self.calls.observe_context(ctx.test_context);

        if let Some(err) = self.outcomes.error(OperationKind::LastOperation) {
            return Err(rejected(OperationKind::LastOperation, err));
        }

        let fields = &self.outcomes.fields;
        debug!(instance_id = %instance_id, state = ?fields.last_operation_state, "Instance operation polled");
        Ok(LastOperation {
            state: fields.last_operation_state,
            description: fields.last_operation_description.clone(),
        })
    }

    fn last_binding_operation(
        &mut self,
        ctx: &RequestContext,
        instance_id: &str,
        binding_id: &str,
        details: PollDetails,
    ) -> BrokerResult<LastOperation> {
        let _span = create_operation_span(
            OperationKind::LastBindingOperation,
            ctx,
            Some(instance_id),
            Some(binding_id),
        )
        .entered();

        self.calls.last_binding_operation = Some(PollRecord {
            instance_id: instance_id.to_string(),
            binding_id: Some(binding_id.to_string()),
            operation_data: details.operation_data,
        });
        self.calls.observe_context(ctx.test_context);

        if let Some(err) = self.outcomes.error(OperationKind::LastBindingOperation) {
            return Err(rejected(OperationKind::LastBindingOperation, err));
        }

        let fields = &self.outcomes.fields;
        debug!(binding_id = %binding_id, state = ?fields.last_operation_state, "Binding operation polled");
        Ok(LastOperation {
            state: fields.last_operation_state,
            description: fields.last_operation_description.clone(),
        })
    }
}
