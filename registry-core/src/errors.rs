//! Errors stemming from key derivation & batch composition

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

/// Errors that can occur while deriving keys or decoding stored values.
///
/// These are local input validation failures, they are never retried.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegistryError {
    /// The notification type id is shorter than the slice kept in a mapping key.
    /// Holds the length of the offending input.
    MalformedDiscriminator(usize),
    /// An array index or length does not fit in the 16 bytes an element key allows
    IndexOverflow,
    /// A stored array length value has a width no LSP2 reader produces.
    /// Holds the length of the offending value.
    MalformedArrayLength(usize),
    /// A stored permission value is wider than 32 bytes.
    /// Holds the length of the offending value.
    MalformedPermissions(usize),
    /// A stored value is neither a packed nor an ABI-padded address.
    /// Holds the length of the offending value.
    MalformedAddress(usize),
    /// An array element key would coincide with the array length key
    IndexCollision,
    /// A batch writes the array length without exactly one matching element
    /// write, or the other way around
    InconsistentArrayUpdate,
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::MalformedDiscriminator(len) => {
                write!(f, "malformed discriminator: expected at least 20 bytes, got {len}")
            }
            RegistryError::IndexOverflow => write!(f, "array index does not fit in 16 bytes"),
            RegistryError::MalformedArrayLength(len) => {
                write!(f, "malformed array length value of {len} bytes")
            }
            RegistryError::MalformedPermissions(len) => {
                write!(f, "malformed permissions value of {len} bytes")
            }
            RegistryError::MalformedAddress(len) => {
                write!(f, "malformed address value of {len} bytes")
            }
            RegistryError::IndexCollision => {
                write!(f, "array element key collides with the array length key")
            }
            RegistryError::InconsistentArrayUpdate => {
                write!(f, "array length and element writes are inconsistent")
            }
        }
    }
}

impl Error for RegistryError {}
