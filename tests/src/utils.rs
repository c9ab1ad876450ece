//! Helpers shared by the registration tests

use std::{sync::Once, time::Duration};

use alloy_primitives::{address, Address, Bytes, B256, U256};
use eyre::Result;
use rand::{thread_rng, Rng};
use registry_common::types::NotificationType;
use registry_core::{
    address::InitCode,
    keys::{
        array_element_key, array_length_key, encode_address, encode_array_length, permissions_key,
    },
    permissions::{Permission, PermissionMask},
};
use scripts::config::{DelegateSource, RegistrationConfig, RegistrationShape};
use tracing_subscriber::{fmt, EnvFilter};

use crate::mock::MockAccount;

/// The account the tests register delegates on
pub const TEST_ACCOUNT: Address = address!("acacacacacacacacacacacacacacacacacacacac");

/// The confirmation timeout used by the tests
pub const TEST_CONFIRMATION_TIMEOUT: Duration = Duration::from_millis(200);

/// Ensures logging is only set up once across tests
static TRACING_INIT: Once = Once::new();

/// Set up logging for a test
pub fn setup_logging() {
    TRACING_INIT.call_once(|| {
        fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .init();
    });
}

/// Random creation bytecode
pub fn random_init_code() -> InitCode {
    let mut rng = thread_rng();
    let bytecode: Vec<u8> = (0..64).map(|_| rng.gen()).collect();
    InitCode::new(Bytes::from(bytecode))
}

/// The permissions granted to forwarding delegates
pub fn forwarder_permissions() -> PermissionMask {
    [Permission::SuperCall, Permission::Reentrancy]
        .into_iter()
        .collect()
}

/// A run deploying fresh random code with `CREATE` and registering it for
/// LSP7 token receptions with the given shape
pub fn deploy_config(shape: RegistrationShape) -> RegistrationConfig {
    deploy_config_with_salt(shape, None)
}

/// A run deploying fresh random code, with `CREATE2` if a salt is given
pub fn deploy_config_with_salt(
    shape: RegistrationShape,
    salt: Option<B256>,
) -> RegistrationConfig {
    let delegate = DelegateSource::Deploy {
        init_code: random_init_code(),
        salt,
    };

    RegistrationConfig::new(
        TEST_ACCOUNT,
        NotificationType::Lsp7TokensRecipient.type_id(),
        forwarder_permissions(),
        delegate,
    )
    .with_shape(shape)
    .with_confirmation_timeout(TEST_CONFIRMATION_TIMEOUT)
}

/// Fill the permission-holder array of the test account with `n` random
/// controllers holding every named permission
pub fn seed_permission_holders(account: &MockAccount, n: u128) -> Result<Vec<Address>> {
    let mut rng = thread_rng();
    let all: PermissionMask = Permission::ALL.into_iter().collect();

    let holders: Vec<Address> = (0..n).map(|_| Address::from(rng.gen::<[u8; 20]>())).collect();
    for (index, holder) in holders.iter().enumerate() {
        let key = array_element_key(U256::from(index))?;
        account.set_key(TEST_ACCOUNT, key, encode_address(*holder));
        account.set_key(TEST_ACCOUNT, permissions_key(*holder), all.to_bytes());
    }
    account.set_key(TEST_ACCOUNT, array_length_key(), encode_array_length(n));

    Ok(holders)
}
