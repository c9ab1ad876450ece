//! Constants used in the account management scripts

/// The RPC endpoint used when none is configured
pub const DEFAULT_RPC_URL: &str = "https://rpc.testnet.lukso.network";

/// The default time to wait for a transaction to be mined, in seconds
pub const DEFAULT_CONFIRMATION_TIMEOUT_SECS: u64 = 120;

/// The interval between two receipt polls, in milliseconds
pub const RECEIPT_POLL_INTERVAL_MS: u64 = 1000;

/// The key of the creation bytecode in a Hardhat artifact
pub const ARTIFACT_BYTECODE_KEY: &str = "bytecode";

/// The key of the contract name in a Hardhat artifact
pub const ARTIFACT_CONTRACT_NAME_KEY: &str = "contractName";

/// The notification type delegates are registered for by default
pub const DEFAULT_NOTIFICATION_TYPE: &str = "LSP7Tokens_RecipientNotification";

/// The permissions granted to a registered delegate by default
pub const DEFAULT_DELEGATE_PERMISSIONS: &str = "SUPER_CALL,REENTRANCY";

/// The operator allowance granted by `authorize-operator` by default
pub const DEFAULT_OPERATOR_ALLOWANCE: &str = "200000000000000000000000000000000000000000";

/// The log filter used when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "info";
