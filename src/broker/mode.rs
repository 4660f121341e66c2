// Mode variants and the policy they expand into

use serde::{Deserialize, Serialize};

/// Behavioral profile fixed when the engine is built
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BrokerMode {
    /// Never answers asynchronously
    #[default]
    Synchronous,
    /// Answers asynchronously when configured or requested
    AsyncCapable,
    /// Refuses callers that do not accept async answers
    AsyncOnly,
}

impl BrokerMode {
    pub fn policy(self) -> ModePolicy {
        match self {
            BrokerMode::Synchronous => ModePolicy {
                provision: ProvisionAsync::Never,
                deprovision: DeprovisionAsync::Lenient,
                bind: BindAsync::Synchronous,
                rebind: Rebind::Overwrite,
            },
            BrokerMode::AsyncCapable => ModePolicy {
                provision: ProvisionAsync::Configured,
                deprovision: DeprovisionAsync::MirrorCaller,
                bind: BindAsync::AcceptFirst,
                rebind: Rebind::Overwrite,
            },
            BrokerMode::AsyncOnly => ModePolicy {
                provision: ProvisionAsync::Required,
                deprovision: DeprovisionAsync::Required,
                bind: BindAsync::Synchronous,
                rebind: Rebind::Overwrite,
            },
        }
    }
}

/// How provisioning interprets the caller's async-allowed flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionAsync {
    /// Results are always synchronous
    Never,
    /// The registry's provision async flag decides
    Configured,
    /// New instances need async-allowed and always answer async
    Required,
}

/// How deprovisioning interprets async-allowed and unknown instances
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeprovisionAsync {
    /// Synchronous; unknown instances still succeed
    Lenient,
    /// Async flag echoes the caller; unknown instances fail
    MirrorCaller,
    /// Needs async-allowed; unknown instances fail
    Required,
}

/// How binding interprets async-allowed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindAsync {
    Synchronous,
    /// First sighting of a binding ID is accepted asynchronously
    AcceptFirst,
}

/// What a re-bind with different details does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rebind {
    Overwrite,
    Reject,
}

/// Capability set that parameterizes the lifecycle engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModePolicy {
    pub provision: ProvisionAsync,
    pub deprovision: DeprovisionAsync,
    pub bind: BindAsync,
    pub rebind: Rebind,
}

impl Default for ModePolicy {
    fn default() -> Self {
        BrokerMode::default().policy()
    }
}

impl ModePolicy {
    pub fn with_rebind(mut self, rebind: Rebind) -> Self {
        self.rebind = rebind;
        self
    }
}
