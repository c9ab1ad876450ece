//! The interface between the registration engine and the account it writes to

use std::future::Future;

use alloy_primitives::{Address, Bytes, TxHash};
use registry_common::types::StorageKey;
use registry_core::{
    address::{CreationScheme, InitCode},
    batch::RegistrationBatch,
};

use crate::errors::BackendError;

/// A handle on a submitted transaction, used to await its outcome
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ConfirmationHandle(pub TxHash);

/// The observed outcome of a mined transaction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Confirmation {
    /// The hash of the transaction
    pub tx_hash: TxHash,
    /// The block the transaction was included in
    pub block_number: Option<u64>,
    /// Whether the transaction executed without reverting
    pub success: bool,
}

/// An account able to create contracts and hold ERC725Y data, together with
/// the node it is reached through.
///
/// Every method is a single round trip. None of them retries a submission.
pub trait AccountBackend {
    /// The nonce `creator` will use for its next `CREATE`
    fn creation_nonce(
        &self,
        creator: Address,
    ) -> impl Future<Output = Result<u64, BackendError>> + Send;

    /// Dry-run the creation of `init_code` by `creator` and return the address
    /// the contract would be created at
    fn simulate_create(
        &self,
        creator: Address,
        scheme: &CreationScheme,
        init_code: &InitCode,
    ) -> impl Future<Output = Result<Address, BackendError>> + Send;

    /// Create the contract through `creator`.
    ///
    /// Resolves once the creation is mined, with the address the account
    /// reported for the new contract.
    fn submit_create(
        &self,
        creator: Address,
        scheme: &CreationScheme,
        init_code: &InitCode,
    ) -> impl Future<Output = Result<(Address, ConfirmationHandle), BackendError>> + Send;

    /// Read the value stored under `key` on `account`. Unset keys read as empty.
    fn read_key(
        &self,
        account: Address,
        key: StorageKey,
    ) -> impl Future<Output = Result<Bytes, BackendError>> + Send;

    /// Submit every write of `batch` to `account` in one transaction
    fn submit_batch(
        &self,
        account: Address,
        batch: RegistrationBatch,
    ) -> impl Future<Output = Result<ConfirmationHandle, BackendError>> + Send;

    /// Wait for the outcome of a submitted transaction
    fn await_confirmation(
        &self,
        handle: ConfirmationHandle,
    ) -> impl Future<Output = Result<Confirmation, BackendError>> + Send;
}
