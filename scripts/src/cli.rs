//! Definitions of CLI arguments and commands for the account management scripts

use std::path::PathBuf;

use alloy_primitives::{Address, B256, U256};
use clap::{Args, Parser, Subcommand};
use registry_common::types::NotificationType;
use registry_core::permissions::Permission;

use crate::{
    commands::{authorize_operator, deploy, list_permissions, register},
    config::RegistrationShape,
    constants::{
        DEFAULT_CONFIRMATION_TIMEOUT_SECS, DEFAULT_DELEGATE_PERMISSIONS,
        DEFAULT_NOTIFICATION_TYPE, DEFAULT_OPERATOR_ALLOWANCE, DEFAULT_RPC_URL,
    },
    errors::ScriptError,
    lsp0::Lsp0Backend,
};

/// Manage the Universal Receiver Delegates of an LSP0 account
#[derive(Parser)]
pub struct Cli {
    /// Private key of a controller of the account
    #[arg(short, long, env = "PRIVATE_KEY", hide_env_values = true)]
    pub priv_key: String,

    /// Network RPC URL
    #[arg(short, long, env = "RPC_URL", default_value = DEFAULT_RPC_URL)]
    pub rpc_url: String,

    /// Address of the LSP0 account to manage
    #[arg(short, long, env = "UP_ADDR")]
    pub account: Address,

    /// The command to run
    #[command(subcommand)]
    pub command: Command,
}

/// The commands supported by the scripts
#[derive(Subcommand)]
pub enum Command {
    /// Deploy and register a Universal Receiver Delegate
    Register(RegisterArgs),
    /// Deploy a contract through the account
    Deploy(DeploymentArgs),
    /// Authorize an operator on an LSP7 token held by the account
    AuthorizeOperator(AuthorizeOperatorArgs),
    /// List the permission holders and the registered delegate
    Permissions(PermissionsArgs),
}

impl Command {
    /// Run the command against `account`
    pub async fn run(self, backend: Lsp0Backend, account: Address) -> Result<(), ScriptError> {
        match self {
            Command::Register(args) => register(args, backend, account).await,
            Command::Deploy(args) => deploy(args, backend, account).await,
            Command::AuthorizeOperator(args) => authorize_operator(args, backend, account).await,
            Command::Permissions(args) => list_permissions(args, backend, account).await,
        }
    }
}

/// Register a Universal Receiver Delegate on the account, deploying it first
/// unless `--delegate` is given.
///
/// All keys are written in a single `setDataBatch` transaction. The controller
/// needs the permissions to add a delegate and, unless the shape is
/// `delegate-only`, to add controllers.
#[derive(Args)]
pub struct RegisterArgs {
    /// The notification type the delegate reacts to
    #[arg(short, long, default_value = DEFAULT_NOTIFICATION_TYPE)]
    pub notification: NotificationType,

    /// The permissions to grant the delegate, comma separated
    #[arg(long, value_delimiter = ',', default_value = DEFAULT_DELEGATE_PERMISSIONS)]
    pub permissions: Vec<Permission>,

    /// Which keys to write
    #[arg(short, long, value_enum, default_value_t = RegistrationShape::Indexed)]
    pub shape: RegistrationShape,

    /// Address of an already deployed delegate
    #[arg(short, long, conflicts_with = "artifact")]
    pub delegate: Option<Address>,

    /// How to deploy the delegate
    #[command(flatten)]
    pub deployment: DeploymentArgs,

    /// How long to wait for each transaction to be mined, in seconds
    #[arg(long, default_value_t = DEFAULT_CONFIRMATION_TIMEOUT_SECS)]
    pub confirmation_timeout_secs: u64,

    /// Log the keys and values that would be written, without deploying or
    /// submitting anything
    #[arg(long)]
    pub dry_run: bool,
}

/// Deploy a contract through the account
#[derive(Args)]
pub struct DeploymentArgs {
    /// Path to the Hardhat artifact of the contract
    #[arg(long)]
    pub artifact: Option<PathBuf>,

    /// ABI-encoded constructor arguments, in hex
    #[arg(long, conflicts_with = "recipient")]
    pub constructor_args: Option<String>,

    /// Recipient of the tokens forwarded by the delegate
    #[arg(long, requires = "percentage")]
    pub recipient: Option<Address>,

    /// Percentage of each received amount the delegate forwards
    #[arg(long, requires = "recipient")]
    pub percentage: Option<u8>,

    /// Tokens the delegate forwards, comma separated
    #[arg(long, value_delimiter = ',', requires = "recipient")]
    pub tokens: Vec<Address>,

    /// Salt to deploy with `CREATE2`, deploys with `CREATE` if omitted
    #[arg(long)]
    pub create2_salt: Option<B256>,
}

/// Authorize an operator on an LSP7 token held by the account
#[derive(Args)]
pub struct AuthorizeOperatorArgs {
    /// Address of the LSP7 token
    #[arg(short, long)]
    pub token: Address,

    /// Address of the operator, typically the registered delegate
    #[arg(short, long)]
    pub operator: Address,

    /// The allowance granted to the operator
    #[arg(long, default_value = DEFAULT_OPERATOR_ALLOWANCE)]
    pub amount: U256,

    /// Data passed to the operator notification, in hex
    #[arg(long)]
    pub data: Option<String>,
}

/// List the permission holders of the account and the delegate registered
/// for a notification type
#[derive(Args)]
pub struct PermissionsArgs {
    /// The notification type to look up the delegate of
    #[arg(short, long, default_value = DEFAULT_NOTIFICATION_TYPE)]
    pub notification: NotificationType,
}
