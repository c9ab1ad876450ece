//! Configuration of a single registration run

use std::time::Duration;

use alloy_primitives::{Address, B256};
use clap::ValueEnum;
use registry_core::{address::InitCode, batch::BatchLayout, permissions::PermissionMask};

use crate::constants::DEFAULT_CONFIRMATION_TIMEOUT_SECS;

/// The set of keys a registration writes
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RegistrationShape {
    /// Register the delegate without granting it permissions
    DelegateOnly,
    /// Register the delegate and grant it permissions
    Simple,
    /// Register the delegate, grant it permissions and append it to the
    /// permission-holder array
    #[default]
    Indexed,
}

impl RegistrationShape {
    /// The batch layout for this shape, given the permission-holder array
    /// length read from the account
    pub fn layout(&self, current_length: u128) -> BatchLayout {
        match self {
            RegistrationShape::DelegateOnly => BatchLayout::DelegateOnly,
            RegistrationShape::Simple => BatchLayout::Simple,
            RegistrationShape::Indexed => BatchLayout::Indexed { current_length },
        }
    }
}

/// Where the delegate registered by a run comes from
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DelegateSource {
    /// Deploy a new delegate through the account
    Deploy {
        /// The delegate's creation code
        init_code: InitCode,
        /// The `CREATE2` salt, or `None` to deploy with `CREATE`
        salt: Option<B256>,
    },
    /// Register a delegate that is already deployed
    Existing(Address),
}

/// The parameters of a registration run
#[derive(Clone, Debug)]
pub struct RegistrationConfig {
    /// The account the delegate is registered on
    pub account: Address,
    /// The notification type id the delegate is registered for
    pub notification_type: B256,
    /// The permissions granted to the delegate
    pub permissions: PermissionMask,
    /// The set of keys written
    pub shape: RegistrationShape,
    /// The delegate to register
    pub delegate: DelegateSource,
    /// How long to wait for the batch to be mined
    pub confirmation_timeout: Duration,
}

impl RegistrationConfig {
    /// A run registering `delegate` on `account` for `notification_type` with
    /// the default indexed shape and confirmation timeout
    pub fn new(
        account: Address,
        notification_type: B256,
        permissions: PermissionMask,
        delegate: DelegateSource,
    ) -> Self {
        Self {
            account,
            notification_type,
            permissions,
            shape: RegistrationShape::default(),
            delegate,
            confirmation_timeout: Duration::from_secs(DEFAULT_CONFIRMATION_TIMEOUT_SECS),
        }
    }

    /// Set the registration shape
    pub fn with_shape(mut self, shape: RegistrationShape) -> Self {
        self.shape = shape;
        self
    }

    /// Set the confirmation timeout
    pub fn with_confirmation_timeout(mut self, timeout: Duration) -> Self {
        self.confirmation_timeout = timeout;
        self
    }
}
