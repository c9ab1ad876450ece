//! The registration state machine.
//!
//! A run moves through `Idle → AddressPredicted → Deployed → BatchComposed →
//! Submitted → Confirmed`, stopping at the first failure. The orchestrator
//! holds no state between runs. It does not guard the permission-holder array
//! length against concurrent writers, so runs against the same account must be
//! serialized by the caller.

use std::fmt::{self, Display, Formatter};

use alloy_primitives::{Address, B256, U256};
use registry_common::types::StorageKey;
use registry_core::{
    address::{predict_address, CreationScheme, InitCode},
    batch::{compose_batch, ArrayAppend, RegistrationBatch},
    keys::{
        array_element_key, array_length_key, decode_address, decode_array_length, delegate_key,
        permissions_key,
    },
    permissions::PermissionMask,
};
use tracing::{debug, info, warn};

use crate::{
    backend::{AccountBackend, Confirmation},
    config::{DelegateSource, RegistrationConfig, RegistrationShape},
    errors::{BackendError, RegistrationError, RegistrationFailure},
};

/// The states a registration run moves through
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RegistrationState {
    /// Nothing has been done yet
    #[default]
    Idle,
    /// The delegate address is known and agreed on by the account
    AddressPredicted,
    /// The delegate exists on chain
    Deployed,
    /// The registration batch is built
    BatchComposed,
    /// The batch transaction was accepted by the node
    Submitted,
    /// The batch transaction was mined successfully
    Confirmed,
}

impl Display for RegistrationState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            RegistrationState::Idle => write!(f, "idle"),
            RegistrationState::AddressPredicted => write!(f, "address-predicted"),
            RegistrationState::Deployed => write!(f, "deployed"),
            RegistrationState::BatchComposed => write!(f, "batch-composed"),
            RegistrationState::Submitted => write!(f, "submitted"),
            RegistrationState::Confirmed => write!(f, "confirmed"),
        }
    }
}

/// The result of a confirmed registration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegistrationReceipt {
    /// The registered delegate
    pub delegate: Address,
    /// The locally predicted delegate address, if the delegate was deployed by the run
    pub predicted: Option<Address>,
    /// The keys written, in submission order
    pub keys: Vec<StorageKey>,
    /// The permission-holder array update, for indexed registrations
    pub array_append: Option<ArrayAppend>,
    /// The outcome of the batch transaction
    pub confirmation: Confirmation,
}

/// An entry of the permission-holder array
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PermissionHolder {
    /// The position of the entry in the array
    pub index: u128,
    /// The address holding permissions
    pub address: Address,
    /// The permissions stored for the address
    pub permissions: PermissionMask,
}

/// What a run has established so far
#[derive(Default)]
struct Progress {
    /// The last state reached
    state: RegistrationState,
    /// The locally predicted delegate address
    predicted: Option<Address>,
    /// The delegate address reported by the account
    actual: Option<Address>,
}

impl Progress {
    /// Move to `state`
    fn advance(&mut self, state: RegistrationState) {
        debug!(from = %self.state, to = %state, "registration transition");
        self.state = state;
    }

    /// Abort the run with `error`
    fn fail(&self, error: RegistrationError) -> RegistrationFailure {
        warn!(state = %self.state, "registration failed: {error}");
        RegistrationFailure {
            error,
            state: self.state,
            predicted: self.predicted,
            actual: self.actual,
        }
    }
}

/// Classify a failure to submit a batch. Only a refusal or a revert reported
/// by the node rules out the batch landing later.
fn submission_error(err: BackendError) -> RegistrationError {
    match err {
        BackendError::Rejected(_) | BackendError::Reverted(_) | BackendError::Simulation(_) => {
            RegistrationError::SubmissionFailed(err.to_string())
        }
        err => RegistrationError::AmbiguousOutcome(err.to_string()),
    }
}

/// Classify a failure to observe the outcome of a submitted batch
fn confirmation_error(err: BackendError) -> RegistrationError {
    RegistrationError::AmbiguousOutcome(err.to_string())
}

/// Deploys delegates through an account and registers them in its storage
pub struct Registrar<B> {
    /// The account backend
    backend: B,
}

impl<B: AccountBackend> Registrar<B> {
    /// Create a registrar over the given backend
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// The backend the registrar writes through
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Run a full registration: obtain the delegate, compose the batch, submit
    /// it and wait for it to be mined.
    ///
    /// A submitted batch is never retried. If its outcome cannot be observed
    /// the run fails with [`RegistrationError::AmbiguousOutcome`].
    pub async fn register(
        &self,
        config: &RegistrationConfig,
    ) -> Result<RegistrationReceipt, RegistrationFailure> {
        let mut progress = Progress::default();

        let delegate = match &config.delegate {
            DelegateSource::Existing(delegate) => {
                info!(delegate = %delegate, "registering existing delegate");
                progress.actual = Some(*delegate);
                progress.advance(RegistrationState::Deployed);
                *delegate
            }
            DelegateSource::Deploy { init_code, salt } => {
                self.deploy_with_progress(config.account, init_code, *salt, &mut progress)
                    .await?
            }
        };

        let batch = self
            .compose(config, delegate)
            .await
            .map_err(|e| progress.fail(e))?;
        let array_append = batch.array_append();
        let keys = batch.keys();
        progress.advance(RegistrationState::BatchComposed);
        debug!(num_keys = keys.len(), "registration batch composed");

        let handle = self
            .backend
            .submit_batch(config.account, batch)
            .await
            .map_err(|e| progress.fail(submission_error(e)))?;
        progress.advance(RegistrationState::Submitted);
        info!(tx = %handle.0, "registration batch submitted");

        let confirmation = tokio::time::timeout(
            config.confirmation_timeout,
            self.backend.await_confirmation(handle),
        )
        .await
        .map_err(|_| {
            progress.fail(RegistrationError::AmbiguousOutcome(format!(
                "no receipt for {} after {:?}",
                handle.0, config.confirmation_timeout
            )))
        })?
        .map_err(|e| progress.fail(confirmation_error(e)))?;

        if !confirmation.success {
            return Err(progress.fail(RegistrationError::SubmissionFailed(format!(
                "batch transaction {} reverted",
                confirmation.tx_hash
            ))));
        }
        progress.advance(RegistrationState::Confirmed);
        info!(
            delegate = %delegate,
            block = ?confirmation.block_number,
            "delegate registered"
        );

        Ok(RegistrationReceipt {
            delegate,
            predicted: progress.predicted,
            keys,
            array_append,
            confirmation,
        })
    }

    /// Compose the batch a registration would submit, without deploying or
    /// writing anything.
    ///
    /// A delegate to deploy is registered under its predicted address, once
    /// the account has agreed on it.
    pub async fn preview(
        &self,
        config: &RegistrationConfig,
    ) -> Result<RegistrationBatch, RegistrationFailure> {
        let mut progress = Progress::default();

        let delegate = match &config.delegate {
            DelegateSource::Existing(delegate) => {
                progress.actual = Some(*delegate);
                *delegate
            }
            DelegateSource::Deploy { init_code, salt } => {
                let (_, predicted) = self
                    .predict_with_progress(config.account, init_code, *salt, &mut progress)
                    .await?;
                predicted
            }
        };

        let batch = self
            .compose(config, delegate)
            .await
            .map_err(|e| progress.fail(e))?;
        progress.advance(RegistrationState::BatchComposed);

        Ok(batch)
    }

    /// Deploy a contract through `account`, checking the address the account
    /// reports against the locally predicted one.
    ///
    /// Deploys with `CREATE2` if a salt is given, `CREATE` otherwise.
    pub async fn deploy(
        &self,
        account: Address,
        init_code: &InitCode,
        salt: Option<B256>,
    ) -> Result<Address, RegistrationFailure> {
        let mut progress = Progress::default();
        self.deploy_with_progress(account, init_code, salt, &mut progress)
            .await
    }

    /// The delegate registered on `account` for `notification_type`, if any
    pub async fn registered_delegate(
        &self,
        account: Address,
        notification_type: B256,
    ) -> Result<Option<Address>, RegistrationError> {
        let key = delegate_key(notification_type.as_slice())?;
        let value = self.backend.read_key(account, key).await?;
        if value.is_empty() {
            return Ok(None);
        }

        Ok(Some(decode_address(&value)?))
    }

    /// Read the permission-holder array of `account`, with the permissions
    /// stored for each entry
    pub async fn permission_holders(
        &self,
        account: Address,
    ) -> Result<Vec<PermissionHolder>, RegistrationError> {
        let length = self.read_array_length(account).await?;

        let mut holders = Vec::new();
        for index in 0..length {
            let element = self
                .backend
                .read_key(account, array_element_key(U256::from(index))?)
                .await?;
            let address = decode_address(&element)?;
            let permissions = self
                .backend
                .read_key(account, permissions_key(address))
                .await?;

            holders.push(PermissionHolder {
                index,
                address,
                permissions: PermissionMask::from_bytes(&permissions)?,
            });
        }

        Ok(holders)
    }

    // -----------
    // | HELPERS |
    // -----------

    /// Predict the creation address and cross-check it with a dry run,
    /// recording each step in `progress`
    async fn predict_with_progress(
        &self,
        account: Address,
        init_code: &InitCode,
        salt: Option<B256>,
        progress: &mut Progress,
    ) -> Result<(CreationScheme, Address), RegistrationFailure> {
        let scheme = match salt {
            Some(salt) => CreationScheme::Create2 { salt },
            None => {
                let nonce = self.backend.creation_nonce(account).await.map_err(|e| {
                    progress.fail(RegistrationError::PredictionUnavailable(e.to_string()))
                })?;
                CreationScheme::Create { nonce }
            }
        };

        let predicted = predict_address(account, &scheme, init_code);
        progress.predicted = Some(predicted);

        let simulated = self
            .backend
            .simulate_create(account, &scheme, init_code)
            .await
            .map_err(|e| progress.fail(RegistrationError::PredictionUnavailable(e.to_string())))?;
        if simulated != predicted {
            return Err(progress.fail(RegistrationError::AddressMismatch {
                predicted,
                actual: simulated,
            }));
        }
        progress.advance(RegistrationState::AddressPredicted);
        info!(address = %predicted, ?scheme, "delegate address predicted");

        Ok((scheme, predicted))
    }

    /// Predict, cross-check and deploy, recording each step in `progress`
    async fn deploy_with_progress(
        &self,
        account: Address,
        init_code: &InitCode,
        salt: Option<B256>,
        progress: &mut Progress,
    ) -> Result<Address, RegistrationFailure> {
        let (scheme, predicted) = self
            .predict_with_progress(account, init_code, salt, progress)
            .await?;

        let (actual, handle) = self
            .backend
            .submit_create(account, &scheme, init_code)
            .await
            .map_err(|e| progress.fail(RegistrationError::DeploymentFailed(e.to_string())))?;
        progress.actual = Some(actual);
        if actual != predicted {
            return Err(progress.fail(RegistrationError::AddressMismatch { predicted, actual }));
        }
        progress.advance(RegistrationState::Deployed);
        info!(address = %actual, tx = %handle.0, "contract deployed");

        Ok(actual)
    }

    /// Read the current permission-holder array length of `account`
    async fn read_array_length(&self, account: Address) -> Result<u128, RegistrationError> {
        let value = self.backend.read_key(account, array_length_key()).await?;
        Ok(decode_array_length(&value)?)
    }

    /// Build the batch registering `delegate` as configured
    async fn compose(
        &self,
        config: &RegistrationConfig,
        delegate: Address,
    ) -> Result<RegistrationBatch, RegistrationError> {
        let current_length = match config.shape {
            RegistrationShape::Indexed => {
                let length = self.read_array_length(config.account).await?;
                debug!(length, "read permission-holder array length");
                length
            }
            RegistrationShape::DelegateOnly | RegistrationShape::Simple => 0,
        };

        Ok(compose_batch(
            delegate,
            config.notification_type.as_slice(),
            config.permissions,
            config.shape.layout(current_length),
        )?)
    }
}
