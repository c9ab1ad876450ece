//! Utilities for the account management scripts

use std::{fs, path::Path, str::FromStr};

use alloy::{
    providers::{DynProvider, ProviderBuilder},
    signers::local::PrivateKeySigner,
    transports::http::reqwest::Url,
};
use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolValue;
use serde_json::Value;
use tracing::debug;

use crate::{
    constants::{ARTIFACT_BYTECODE_KEY, ARTIFACT_CONTRACT_NAME_KEY},
    errors::ScriptError,
    lsp0::Lsp0Backend,
};

/// Sets up an LSP0 backend signing with `priv_key` through the node at `rpc_url`
pub fn setup_client(priv_key: &str, rpc_url: &str) -> Result<Lsp0Backend, ScriptError> {
    let url =
        Url::parse(rpc_url).map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
    let signer = PrivateKeySigner::from_str(priv_key)
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
    let controller = signer.address();

    let provider = ProviderBuilder::new()
        .wallet(signer)
        .with_simple_nonce_management()
        .connect_http(url);
    debug!(controller = %controller, "client initialized");

    Ok(Lsp0Backend::new(DynProvider::new(provider), controller))
}

/// Reads the creation bytecode from a Hardhat compilation artifact
pub fn read_artifact_bytecode(path: &Path) -> Result<Bytes, ScriptError> {
    let contents =
        fs::read_to_string(path).map_err(|e| ScriptError::ArtifactParsing(e.to_string()))?;
    let artifact: Value =
        serde_json::from_str(&contents).map_err(|e| ScriptError::ArtifactParsing(e.to_string()))?;

    let bytecode = artifact[ARTIFACT_BYTECODE_KEY].as_str().ok_or_else(|| {
        ScriptError::ArtifactParsing(format!("missing `{}` field", ARTIFACT_BYTECODE_KEY))
    })?;
    let bytecode =
        parse_hex_bytes(bytecode).map_err(|e| ScriptError::ArtifactParsing(e.to_string()))?;
    if bytecode.is_empty() {
        return Err(ScriptError::ArtifactParsing(
            "artifact has no creation bytecode, is the contract abstract?".to_string(),
        ));
    }

    if let Some(name) = artifact[ARTIFACT_CONTRACT_NAME_KEY].as_str() {
        debug!(contract = name, len = bytecode.len(), "read artifact bytecode");
    }

    Ok(bytecode)
}

/// Parses a hex string, with or without its `0x` prefix
pub fn parse_hex_bytes(s: &str) -> Result<Bytes, ScriptError> {
    hex::decode(s.trim_start_matches("0x"))
        .map(Bytes::from)
        .map_err(|e| ScriptError::InvalidArgument(format!("invalid hex `{}`: {}", s, e)))
}

/// ABI-encodes the constructor arguments of the forwarding delegate:
/// `(address recipient, uint256 percentage, address[] tokens)`
pub fn encode_forwarder_args(recipient: Address, percentage: u8, tokens: &[Address]) -> Bytes {
    (recipient, U256::from(percentage), tokens.to_vec())
        .abi_encode_params()
        .into()
}
