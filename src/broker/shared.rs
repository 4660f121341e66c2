// Mutex-guarded handle for serving one broker from parallel request handlers

use std::sync::{Arc, Mutex, MutexGuard};

use super::context::RequestContext;
use super::errors::BrokerResult;
use super::traits::ServiceBroker;
use super::types::*;

/// Cloneable handle that serializes every call into the wrapped broker.
///
/// The lock is held for exactly one operation, so at most one mutation is in
/// flight at a time.
#[derive(Debug)]
pub struct SharedBroker<B> {
    inner: Arc<Mutex<B>>,
}

impl<B> Clone for SharedBroker<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B: ServiceBroker> SharedBroker<B> {
    pub fn new(broker: B) -> Self {
        Self {
            inner: Arc::new(Mutex::new(broker)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, B> {
        // A panicking handler cannot leave the maps half-written: every
        // operation mutates them with a single insert.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Read the wrapped broker, e.g. its call log
    pub fn inspect<R>(&self, f: impl FnOnce(&B) -> R) -> R {
        f(&self.lock())
    }

    /// Reconfigure the wrapped broker between requests
    pub fn configure<R>(&self, f: impl FnOnce(&mut B) -> R) -> R {
        f(&mut self.lock())
    }

    pub fn services(&self, ctx: &RequestContext) -> BrokerResult<Vec<Service>> {
        self.lock().services(ctx)
    }

    pub fn provision(
        &self,
        ctx: &RequestContext,
        instance_id: &str,
        details: ProvisionDetails,
        async_allowed: bool,
    ) -> BrokerResult<ProvisionedServiceSpec> {
        self.lock().provision(ctx, instance_id, details, async_allowed)
    }

    pub fn update(
        &self,
        ctx: &RequestContext,
        instance_id: &str,
        details: UpdateDetails,
        async_allowed: bool,
    ) -> BrokerResult<UpdateServiceSpec> {
        self.lock().update(ctx, instance_id, details, async_allowed)
    }

    pub fn deprovision(
        &self,
        ctx: &RequestContext,
        instance_id: &str,
        details: DeprovisionDetails,
        async_allowed: bool,
    ) -> BrokerResult<DeprovisionServiceSpec> {
        self.lock()
            .deprovision(ctx, instance_id, details, async_allowed)
    }

    pub fn get_instance(
        &self,
        ctx: &RequestContext,
        instance_id: &str,
        details: FetchInstanceDetails,
    ) -> BrokerResult<GetInstanceDetailsSpec> {
        self.lock().get_instance(ctx, instance_id, details)
    }

    pub fn bind(
        &self,
        ctx: &RequestContext,
        instance_id: &str,
        binding_id: &str,
        details: BindDetails,
        async_allowed: bool,
    ) -> BrokerResult<Binding> {
        self.lock()
            .bind(ctx, instance_id, binding_id, details, async_allowed)
    }

    pub fn unbind(
        &self,
        ctx: &RequestContext,
        instance_id: &str,
        binding_id: &str,
        details: UnbindDetails,
        async_allowed: bool,
    ) -> BrokerResult<UnbindSpec> {
        self.lock()
            .unbind(ctx, instance_id, binding_id, details, async_allowed)
    }

    pub fn get_binding(
        &self,
        ctx: &RequestContext,
        instance_id: &str,
        binding_id: &str,
        details: FetchBindingDetails,
    ) -> BrokerResult<GetBindingSpec> {
        self.lock()
            .get_binding(ctx, instance_id, binding_id, details)
    }

    pub fn last_operation(
        &self,
        ctx: &RequestContext,
        instance_id: &str,
        details: PollDetails,
    ) -> BrokerResult<LastOperation> {
        self.lock().last_operation(ctx, instance_id, details)
    }

    pub fn last_binding_operation(
        &self,
        ctx: &RequestContext,
        instance_id: &str,
        binding_id: &str,
        details: PollDetails,
    ) -> BrokerResult<LastOperation> {
        self.lock()
            .last_binding_operation(ctx, instance_id, binding_id, details)
    }
}
