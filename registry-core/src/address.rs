//! Prediction of the address a contract will be created at.
//!
//! The same function backs the pre-deployment cross-check and the key
//! derivation, so the two can never disagree.

use alloy_primitives::{keccak256, Address, Bytes, B256};
use registry_common::constants::{OPERATION_CREATE, OPERATION_CREATE2};

/// The opcode the account uses to create the contract
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CreationScheme {
    /// `CREATE`, addressed by the creator's nonce at creation time
    Create {
        /// The nonce of the creator when the creation is executed
        nonce: u64,
    },
    /// `CREATE2`, addressed by a salt and the init code hash
    Create2 {
        /// The salt passed to `CREATE2`
        salt: B256,
    },
}

impl CreationScheme {
    /// The ERC725X operation type that performs this kind of creation
    pub fn operation_type(&self) -> u8 {
        match self {
            CreationScheme::Create { .. } => OPERATION_CREATE,
            CreationScheme::Create2 { .. } => OPERATION_CREATE2,
        }
    }
}

/// Contract creation code: the compiled bytecode followed by its ABI-encoded
/// constructor arguments
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InitCode {
    /// The compiled creation bytecode
    bytecode: Bytes,
    /// The ABI-encoded constructor arguments
    constructor_args: Bytes,
}

impl InitCode {
    /// Init code for a contract without constructor arguments
    pub fn new(bytecode: Bytes) -> Self {
        Self {
            bytecode,
            constructor_args: Bytes::new(),
        }
    }

    /// Append ABI-encoded constructor arguments to the bytecode
    pub fn with_constructor_args(mut self, constructor_args: Bytes) -> Self {
        self.constructor_args = constructor_args;
        self
    }

    /// The full creation code
    pub fn code(&self) -> Bytes {
        [&self.bytecode[..], &self.constructor_args[..]]
            .concat()
            .into()
    }

    /// The keccak hash of the full creation code, as used by `CREATE2`
    pub fn hash(&self) -> B256 {
        keccak256(self.code())
    }

    /// Whether there is no bytecode to deploy
    pub fn is_empty(&self) -> bool {
        self.bytecode.is_empty()
    }

    /// The `data` argument of the ERC725X `execute` call creating this contract.
    ///
    /// ERC725X reads the `CREATE2` salt from the last 32 bytes of the payload.
    pub fn execute_payload(&self, scheme: &CreationScheme) -> Bytes {
        match scheme {
            CreationScheme::Create { .. } => self.code(),
            CreationScheme::Create2 { salt } => [
                &self.bytecode[..],
                &self.constructor_args[..],
                salt.as_slice(),
            ]
            .concat()
            .into(),
        }
    }
}

/// Predict the address `creator` will assign to the contract created from
/// `init_code` with the given scheme
pub fn predict_address(creator: Address, scheme: &CreationScheme, init_code: &InitCode) -> Address {
    match scheme {
        CreationScheme::Create { nonce } => creator.create(*nonce),
        CreationScheme::Create2 { salt } => creator.create2(*salt, init_code.hash()),
    }
}
