// Broker interface the boundary layer programs against

use super::context::RequestContext;
use super::errors::BrokerResult;
use super::types::*;

/// One operation per lifecycle verb of the service broker protocol
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait ServiceBroker {
    /// List offered services and their plans
    fn services(&mut self, ctx: &RequestContext) -> BrokerResult<Vec<Service>>;

    /// Create a service instance
    fn provision(
        &mut self,
        ctx: &RequestContext,
        instance_id: &str,
        details: ProvisionDetails,
        async_allowed: bool,
    ) -> BrokerResult<ProvisionedServiceSpec>;

    /// Change plan or parameters of an instance
    fn update(
        &mut self,
        ctx: &RequestContext,
        instance_id: &str,
        details: UpdateDetails,
        async_allowed: bool,
    ) -> BrokerResult<UpdateServiceSpec>;

    /// Delete a service instance
    fn deprovision(
        &mut self,
        ctx: &RequestContext,
        instance_id: &str,
        details: DeprovisionDetails,
        async_allowed: bool,
    ) -> BrokerResult<DeprovisionServiceSpec>;

    /// Fetch a service instance
    fn get_instance(
        &mut self,
        ctx: &RequestContext,
        instance_id: &str,
        details: FetchInstanceDetails,
    ) -> BrokerResult<GetInstanceDetailsSpec>;

    /// Create a binding for an instance
    fn bind(
        &mut self,
        ctx: &RequestContext,
        instance_id: &str,
        binding_id: &str,
        details: BindDetails,
        async_allowed: bool,
    ) -> BrokerResult<Binding>;

    /// Delete a binding
    fn unbind(
        &mut self,
        ctx: &RequestContext,
        instance_id: &str,
        binding_id: &str,
        details: UnbindDetails,
        async_allowed: bool,
    ) -> BrokerResult<UnbindSpec>;

    /// Fetch a binding
    fn get_binding(
        &mut self,
        ctx: &RequestContext,
        instance_id: &str,
        binding_id: &str,
        details: FetchBindingDetails,
    ) -> BrokerResult<GetBindingSpec>;

    /// Poll an asynchronous instance operation
    fn last_operation(
        &mut self,
        ctx: &RequestContext,
        instance_id: &str,
        details: PollDetails,
    ) -> BrokerResult<LastOperation>;

    /// Poll an asynchronous binding operation
    fn last_binding_operation(
        &mut self,
        ctx: &RequestContext,
        instance_id: &str,
        binding_id: &str,
        details: PollDetails,
    ) -> BrokerResult<LastOperation>;
}
