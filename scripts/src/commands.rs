//! Implementations of the various account management commands

use std::time::Duration;

use alloy_primitives::{Address, Bytes};
use alloy_sol_types::SolCall;
use registry_core::{address::InitCode, permissions::PermissionMask};
use tracing::info;

use crate::{
    cli::{AuthorizeOperatorArgs, DeploymentArgs, PermissionsArgs, RegisterArgs},
    config::{DelegateSource, RegistrationConfig},
    errors::ScriptError,
    lsp0::Lsp0Backend,
    orchestrator::Registrar,
    solidity::ILSP7,
    utils::{encode_forwarder_args, parse_hex_bytes, read_artifact_bytecode},
};

/// The largest share of a received amount a forwarder can be configured with
const MAX_FORWARD_PERCENTAGE: u8 = 100;

/// Deploys (unless an existing delegate is given) and registers a Universal
/// Receiver Delegate on the account
pub async fn register(
    args: RegisterArgs,
    backend: Lsp0Backend,
    account: Address,
) -> Result<(), ScriptError> {
    let delegate = match args.delegate {
        Some(delegate) => DelegateSource::Existing(delegate),
        None => DelegateSource::Deploy {
            init_code: build_init_code(&args.deployment)?,
            salt: args.deployment.create2_salt,
        },
    };
    let permissions: PermissionMask = args.permissions.iter().copied().collect();
    let timeout = Duration::from_secs(args.confirmation_timeout_secs);

    let config = RegistrationConfig::new(
        account,
        args.notification.type_id(),
        permissions,
        delegate,
    )
    .with_shape(args.shape)
    .with_confirmation_timeout(timeout);

    info!(
        "Registering delegate for {} on {:#x} with permissions [{}]",
        args.notification,
        account,
        permissions.describe()
    );

    let registrar = Registrar::new(backend.with_confirmation_timeout(timeout));
    if args.dry_run {
        let batch = registrar.preview(&config).await?;
        info!("Dry run, {} keys would be written:", batch.len());
        for (key, value) in batch.iter() {
            info!("{} => {}", key, value);
        }
        return Ok(());
    }

    let receipt = registrar.register(&config).await?;

    info!(
        "Delegate {:#x} registered in transaction {:#x}",
        receipt.delegate, receipt.confirmation.tx_hash
    );
    if let Some(append) = receipt.array_append {
        info!("Delegate added to the permission holders at index {}", append.index);
    }

    Ok(())
}

/// Deploys a contract through the account
pub async fn deploy(
    args: DeploymentArgs,
    backend: Lsp0Backend,
    account: Address,
) -> Result<(), ScriptError> {
    let init_code = build_init_code(&args)?;

    let registrar = Registrar::new(backend);
    let address = registrar
        .deploy(account, &init_code, args.create2_salt)
        .await?;

    info!("Contract deployed at: {:#x}", address);

    Ok(())
}

/// Makes the account authorize an operator on an LSP7 token
pub async fn authorize_operator(
    args: AuthorizeOperatorArgs,
    backend: Lsp0Backend,
    account: Address,
) -> Result<(), ScriptError> {
    let data = match &args.data {
        Some(data) => parse_hex_bytes(data)?,
        None => Bytes::new(),
    };
    let calldata = ILSP7::authorizeOperatorCall {
        operator: args.operator,
        amount: args.amount,
        operatorNotificationData: data,
    }
    .abi_encode();

    let confirmation = backend
        .execute_call(account, args.token, calldata.into())
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;
    if !confirmation.success {
        return Err(ScriptError::ContractInteraction(format!(
            "authorizeOperator transaction {:#x} reverted",
            confirmation.tx_hash
        )));
    }

    info!(
        "Operator {:#x} authorized for {} on token {:#x}",
        args.operator, args.amount, args.token
    );

    Ok(())
}

/// Logs the delegate registered for a notification type and the permission
/// holders of the account
pub async fn list_permissions(
    args: PermissionsArgs,
    backend: Lsp0Backend,
    account: Address,
) -> Result<(), ScriptError> {
    let registrar = Registrar::new(backend);

    let delegate = registrar
        .registered_delegate(account, args.notification.type_id())
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;
    match delegate {
        Some(delegate) => info!("{} delegate: {:#x}", args.notification, delegate),
        None => info!("No delegate registered for {}", args.notification),
    }

    let holders = registrar
        .permission_holders(account)
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;
    info!("{} permission holders", holders.len());
    for holder in holders {
        info!(
            "[{}] {:#x}: {}",
            holder.index,
            holder.address,
            holder.permissions.describe()
        );
    }

    Ok(())
}

/// Builds the creation code of the contract to deploy from an artifact and
/// either raw or forwarder constructor arguments
fn build_init_code(args: &DeploymentArgs) -> Result<InitCode, ScriptError> {
    let artifact = args.artifact.as_ref().ok_or_else(|| {
        ScriptError::InvalidArgument("`--artifact` is required to deploy".to_string())
    })?;
    let bytecode = read_artifact_bytecode(artifact)?;

    let constructor_args = match (&args.constructor_args, args.recipient) {
        (Some(raw), None) => parse_hex_bytes(raw)?,
        (None, Some(recipient)) => {
            let percentage = args.percentage.ok_or_else(|| {
                ScriptError::CalldataConstruction("`--percentage` is required".to_string())
            })?;
            if percentage > MAX_FORWARD_PERCENTAGE {
                return Err(ScriptError::CalldataConstruction(format!(
                    "percentage {} exceeds {}",
                    percentage, MAX_FORWARD_PERCENTAGE
                )));
            }
            encode_forwarder_args(recipient, percentage, &args.tokens)
        }
        (None, None) => Bytes::new(),
        (Some(_), Some(_)) => {
            return Err(ScriptError::CalldataConstruction(
                "give either raw constructor arguments or forwarder arguments".to_string(),
            ))
        }
    };

    Ok(InitCode::new(bytecode).with_constructor_args(constructor_args))
}
