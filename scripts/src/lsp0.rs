//! An [`AccountBackend`] over an LSP0 ERC725Account reached through a JSON-RPC node

use std::time::Duration;

use alloy::{
    contract::Error as ContractError,
    providers::{DynProvider, Provider},
    rpc::types::TransactionReceipt,
    transports::TransportError,
};
use alloy_primitives::{Address, Bytes, TxHash, U256};
use registry_common::{constants::OPERATION_CALL, types::StorageKey};
use registry_core::{
    address::{CreationScheme, InitCode},
    batch::RegistrationBatch,
    keys::decode_address,
};
use tracing::debug;

use crate::{
    backend::{AccountBackend, Confirmation, ConfirmationHandle},
    constants::{DEFAULT_CONFIRMATION_TIMEOUT_SECS, RECEIPT_POLL_INTERVAL_MS},
    errors::BackendError,
    solidity::ILSP0::{self, ILSP0Instance},
};

/// An account backend signing as a controller of LSP0 accounts
#[derive(Clone)]
pub struct Lsp0Backend {
    /// The provider, with the controller's wallet attached
    provider: DynProvider,
    /// The address of the controller the provider signs for
    controller: Address,
    /// The interval between two receipt polls
    poll_interval: Duration,
    /// The number of receipt polls before giving up on a transaction
    max_poll_attempts: u64,
}

impl Lsp0Backend {
    /// Create a backend signing as `controller` through `provider`
    pub fn new(provider: DynProvider, controller: Address) -> Self {
        Self {
            provider,
            controller,
            poll_interval: Duration::from_millis(RECEIPT_POLL_INTERVAL_MS),
            max_poll_attempts: DEFAULT_CONFIRMATION_TIMEOUT_SECS * 1000 / RECEIPT_POLL_INTERVAL_MS,
        }
    }

    /// Poll for receipts for at most `timeout`
    pub fn with_confirmation_timeout(mut self, timeout: Duration) -> Self {
        let attempts = timeout.as_millis() / self.poll_interval.as_millis().max(1);
        self.max_poll_attempts = u64::try_from(attempts).unwrap_or(u64::MAX).max(1);
        self
    }

    /// The controller the backend signs for
    pub fn controller(&self) -> Address {
        self.controller
    }

    /// Make `account` call `target` with `data`, and wait for the transaction
    /// to be mined
    pub async fn execute_call(
        &self,
        account: Address,
        target: Address,
        data: Bytes,
    ) -> Result<Confirmation, BackendError> {
        let pending = self
            .account(account)
            .execute(U256::from(OPERATION_CALL), target, U256::ZERO, data)
            .send()
            .await
            .map_err(map_send_error)?;

        self.await_confirmation(ConfirmationHandle(*pending.tx_hash()))
            .await
    }

    /// A binding to the account at `address`
    fn account(&self, address: Address) -> ILSP0Instance<DynProvider> {
        ILSP0::new(address, self.provider.clone())
    }

    /// Wait for the receipt of `tx_hash`
    async fn poll_receipt(&self, tx_hash: TxHash) -> Result<TransactionReceipt, BackendError> {
        // Polled directly, watching the pending transaction is unreliable on some nodes
        let mut remaining_attempts = self.max_poll_attempts;
        while remaining_attempts > 0 {
            let receipt = self
                .provider
                .get_transaction_receipt(tx_hash)
                .await
                .map_err(|e| BackendError::Unreachable(e.to_string()))?;

            match receipt {
                Some(receipt) => return Ok(receipt),
                None => {
                    tokio::time::sleep(self.poll_interval).await;
                    remaining_attempts -= 1;
                }
            }
        }

        Err(BackendError::Timeout(format!(
            "no receipt for {} after {} attempts",
            tx_hash, self.max_poll_attempts
        )))
    }
}

impl AccountBackend for Lsp0Backend {
    async fn creation_nonce(&self, creator: Address) -> Result<u64, BackendError> {
        self.provider
            .get_transaction_count(creator)
            .await
            .map_err(|e| BackendError::Unreachable(e.to_string()))
    }

    async fn simulate_create(
        &self,
        creator: Address,
        scheme: &CreationScheme,
        init_code: &InitCode,
    ) -> Result<Address, BackendError> {
        let output = self
            .account(creator)
            .execute(
                U256::from(scheme.operation_type()),
                Address::ZERO,
                U256::ZERO,
                init_code.execute_payload(scheme),
            )
            .from(self.controller)
            .call()
            .await
            .map_err(|e| BackendError::Simulation(e.to_string()))?;

        // The account returns the created address packed
        decode_address(&output).map_err(|e| BackendError::InvalidResponse(e.to_string()))
    }

    async fn submit_create(
        &self,
        creator: Address,
        scheme: &CreationScheme,
        init_code: &InitCode,
    ) -> Result<(Address, ConfirmationHandle), BackendError> {
        let pending = self
            .account(creator)
            .execute(
                U256::from(scheme.operation_type()),
                Address::ZERO,
                U256::ZERO,
                init_code.execute_payload(scheme),
            )
            .send()
            .await
            .map_err(map_send_error)?;
        let handle = ConfirmationHandle(*pending.tx_hash());
        debug!(tx = %handle.0, "creation submitted");

        let receipt = self.poll_receipt(handle.0).await?;
        if !receipt.status() {
            return Err(BackendError::Reverted(format!(
                "creation transaction {} reverted",
                handle.0
            )));
        }

        let created = receipt
            .inner
            .logs()
            .iter()
            .filter(|log| log.address() == creator)
            .find_map(|log| log.log_decode::<ILSP0::ContractCreated>().ok())
            .map(|log| log.inner.data.contractAddress)
            .ok_or_else(|| {
                BackendError::InvalidResponse(format!("no ContractCreated event in {}", handle.0))
            })?;

        Ok((created, handle))
    }

    async fn read_key(&self, account: Address, key: StorageKey) -> Result<Bytes, BackendError> {
        self.account(account)
            .getData(key)
            .call()
            .await
            .map_err(|e| BackendError::Unreachable(e.to_string()))
    }

    async fn submit_batch(
        &self,
        account: Address,
        batch: RegistrationBatch,
    ) -> Result<ConfirmationHandle, BackendError> {
        let (keys, values) = batch.into_parts();
        let pending = self
            .account(account)
            .setDataBatch(keys, values)
            .send()
            .await
            .map_err(map_send_error)?;

        Ok(ConfirmationHandle(*pending.tx_hash()))
    }

    async fn await_confirmation(
        &self,
        handle: ConfirmationHandle,
    ) -> Result<Confirmation, BackendError> {
        let receipt = self.poll_receipt(handle.0).await?;
        Ok(Confirmation {
            tx_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            success: receipt.status(),
        })
    }
}

/// Classify an error returned when sending a transaction.
///
/// An error response means the node refused the transaction. Any other
/// transport failure leaves open whether the transaction reached the mempool.
fn map_send_error(err: ContractError) -> BackendError {
    match err {
        ContractError::TransportError(TransportError::ErrorResp(payload)) => {
            BackendError::Rejected(payload.message.to_string())
        }
        ContractError::TransportError(err) => BackendError::ConnectionLost(err.to_string()),
        err => BackendError::Rejected(err.to_string()),
    }
}
