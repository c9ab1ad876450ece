//! Definitions of errors that can occur during registration and in the
//! account management scripts

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

use alloy_primitives::Address;
use registry_core::errors::RegistryError;

use crate::orchestrator::RegistrationState;

/// Errors reported by an account backend
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BackendError {
    /// The node could not be reached
    Unreachable(String),
    /// The connection failed after a request was sent, so the node may have
    /// acted on it
    ConnectionLost(String),
    /// The node or the account refused the transaction
    Rejected(String),
    /// The transaction was mined but reverted
    Reverted(String),
    /// No outcome was observed before the deadline
    Timeout(String),
    /// The creation could not be dry-run
    Simulation(String),
    /// The node returned a response that could not be interpreted
    InvalidResponse(String),
}

impl Display for BackendError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Unreachable(s) => write!(f, "node unreachable: {}", s),
            BackendError::ConnectionLost(s) => write!(f, "connection lost: {}", s),
            BackendError::Rejected(s) => write!(f, "transaction rejected: {}", s),
            BackendError::Reverted(s) => write!(f, "transaction reverted: {}", s),
            BackendError::Timeout(s) => write!(f, "timed out: {}", s),
            BackendError::Simulation(s) => write!(f, "simulation failed: {}", s),
            BackendError::InvalidResponse(s) => write!(f, "invalid response: {}", s),
        }
    }
}

impl Error for BackendError {}

/// Errors that abort a registration run
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegistrationError {
    /// The delegate address could not be determined before deployment
    PredictionUnavailable(String),
    /// The delegate could not be deployed
    DeploymentFailed(String),
    /// Two derivations of the delegate address disagree
    AddressMismatch {
        /// The locally derived address
        predicted: Address,
        /// The address reported by the account
        actual: Address,
    },
    /// The batch was refused, or mined and reverted
    SubmissionFailed(String),
    /// The batch was submitted but its outcome is unknown
    AmbiguousOutcome(String),
    /// Account storage could not be read
    Backend(BackendError),
    /// A key or value could not be derived
    Registry(RegistryError),
}

impl Display for RegistrationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            RegistrationError::PredictionUnavailable(s) => {
                write!(f, "delegate address prediction unavailable: {}", s)
            }
            RegistrationError::DeploymentFailed(s) => write!(f, "deployment failed: {}", s),
            RegistrationError::AddressMismatch { predicted, actual } => write!(
                f,
                "address mismatch: predicted {}, account reported {}",
                predicted, actual
            ),
            RegistrationError::SubmissionFailed(s) => write!(f, "batch submission failed: {}", s),
            RegistrationError::AmbiguousOutcome(s) => {
                write!(f, "batch outcome unknown, inspect the account before retrying: {}", s)
            }
            RegistrationError::Backend(e) => write!(f, "error reading account: {}", e),
            RegistrationError::Registry(e) => write!(f, "{}", e),
        }
    }
}

impl Error for RegistrationError {}

impl From<RegistryError> for RegistrationError {
    fn from(e: RegistryError) -> Self {
        RegistrationError::Registry(e)
    }
}

impl From<BackendError> for RegistrationError {
    fn from(e: BackendError) -> Self {
        RegistrationError::Backend(e)
    }
}

/// A failed registration run, with enough context to finish it by hand
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegistrationFailure {
    /// The error that aborted the run
    pub error: RegistrationError,
    /// The last state the run reached
    pub state: RegistrationState,
    /// The locally predicted delegate address, if prediction ran
    pub predicted: Option<Address>,
    /// The delegate address confirmed by the account, if any
    pub actual: Option<Address>,
}

impl Display for RegistrationFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "registration failed after {}: {}", self.state, self.error)?;
        if let Some(predicted) = self.predicted {
            write!(f, " (predicted delegate {})", predicted)?;
        }
        if let Some(actual) = self.actual {
            write!(f, " (deployed delegate {})", actual)?;
        }
        Ok(())
    }
}

impl Error for RegistrationFailure {}

/// Errors that can occur during the execution of the account management scripts
#[derive(Debug)]
pub enum ScriptError {
    /// Error parsing a Hardhat compilation artifact
    ArtifactParsing(String),
    /// Error initializing the RPC client
    ClientInitialization(String),
    /// Error parsing a command line argument
    InvalidArgument(String),
    /// Error constructing calldata for a contract method
    CalldataConstruction(String),
    /// Error calling a contract method
    ContractInteraction(String),
    /// A registration or deployment run failed
    Registration(RegistrationFailure),
}

impl Display for ScriptError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::ArtifactParsing(s) => write!(f, "error parsing artifact: {}", s),
            ScriptError::ClientInitialization(s) => write!(f, "error initializing client: {}", s),
            ScriptError::InvalidArgument(s) => write!(f, "invalid argument: {}", s),
            ScriptError::CalldataConstruction(s) => write!(f, "error constructing calldata: {}", s),
            ScriptError::ContractInteraction(s) => {
                write!(f, "error interacting with contract: {}", s)
            }
            ScriptError::Registration(e) => write!(f, "{}", e),
        }
    }
}

impl Error for ScriptError {}

impl From<RegistrationFailure> for ScriptError {
    fn from(e: RegistrationFailure) -> Self {
        ScriptError::Registration(e)
    }
}
