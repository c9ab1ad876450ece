//! Derivation of the ERC725Y data keys written during a registration.
//!
//! Every key is exactly [`NUM_BYTES_STORAGE_KEY`] bytes. The byte layouts
//! follow LSP2 and must match what the account reads back bit for bit:
//!
//! | Key            | Layout                                                   |
//! |----------------|----------------------------------------------------------|
//! | Delegate       | 10-byte prefix, 2 zero bytes, first 20 bytes of type id  |
//! | Permissions    | 12-byte prefix, 20-byte address                          |
//! | Array length   | `keccak256("AddressPermissions[]")`                      |
//! | Array element  | 16-byte prefix, 16-byte big-endian index                 |

use alloy_primitives::{Address, Bytes, FixedBytes, B256, U256};
use registry_common::{
    constants::{
        ADDRESS_PERMISSIONS_ARRAY_INDEX_PREFIX, ADDRESS_PERMISSIONS_ARRAY_LENGTH_KEY,
        ADDRESS_PERMISSIONS_PREFIX, LSP1_DELEGATE_PREFIX, NUM_BYTES_ADDRESS,
        NUM_BYTES_ARRAY_INDEX, NUM_BYTES_ARRAY_PREFIX, NUM_BYTES_DISCRIMINATOR,
        NUM_BYTES_MAPPING_PREFIX, NUM_BYTES_MAPPING_SEPARATOR, NUM_BYTES_STORAGE_KEY,
    },
    types::StorageKey,
};

use crate::errors::RegistryError;

/// A semantic description of a data key
#[derive(Clone, Copy, Debug)]
pub enum KeyDescriptor<'a> {
    /// The delegate responsible for the notification type with the given id
    Delegate(&'a [u8]),
    /// The permissions granted to the given address
    Permissions(Address),
    /// The length of the permission-holder array
    ArrayLength,
    /// The permission-holder array slot at the given index
    ArrayElement(U256),
}

/// Derive the data key described by `descriptor`
pub fn derive_key(descriptor: KeyDescriptor<'_>) -> Result<StorageKey, RegistryError> {
    match descriptor {
        KeyDescriptor::Delegate(discriminator) => delegate_key(discriminator),
        KeyDescriptor::Permissions(address) => Ok(permissions_key(address)),
        KeyDescriptor::ArrayLength => Ok(array_length_key()),
        KeyDescriptor::ArrayElement(index) => array_element_key(index),
    }
}

/// The `LSP1UniversalReceiverDelegate:<bytes32>` key for a notification type id
pub fn delegate_key(discriminator: &[u8]) -> Result<StorageKey, RegistryError> {
    mapping_key(LSP1_DELEGATE_PREFIX, discriminator)
}

/// Build an LSP2 `Mapping` key from its first word and a discriminator.
///
/// Only the first [`NUM_BYTES_DISCRIMINATOR`] bytes of the discriminator are
/// kept. A shorter discriminator is rejected rather than zero-padded.
pub fn mapping_key(
    prefix: FixedBytes<NUM_BYTES_MAPPING_PREFIX>,
    discriminator: &[u8],
) -> Result<StorageKey, RegistryError> {
    if discriminator.len() < NUM_BYTES_DISCRIMINATOR {
        return Err(RegistryError::MalformedDiscriminator(discriminator.len()));
    }

    let mut key = [0u8; NUM_BYTES_STORAGE_KEY];
    key[..NUM_BYTES_MAPPING_PREFIX].copy_from_slice(prefix.as_slice());
    key[NUM_BYTES_MAPPING_PREFIX + NUM_BYTES_MAPPING_SEPARATOR..]
        .copy_from_slice(&discriminator[..NUM_BYTES_DISCRIMINATOR]);

    Ok(B256::from(key))
}

/// The `AddressPermissions:Permissions:<address>` key
pub fn permissions_key(address: Address) -> StorageKey {
    let mut key = [0u8; NUM_BYTES_STORAGE_KEY];
    key[..NUM_BYTES_STORAGE_KEY - NUM_BYTES_ADDRESS]
        .copy_from_slice(ADDRESS_PERMISSIONS_PREFIX.as_slice());
    key[NUM_BYTES_STORAGE_KEY - NUM_BYTES_ADDRESS..].copy_from_slice(address.as_slice());

    B256::from(key)
}

/// The `AddressPermissions[]` key, holding the length of the array
pub fn array_length_key() -> StorageKey {
    ADDRESS_PERMISSIONS_ARRAY_LENGTH_KEY
}

/// The `AddressPermissions[]` element key at `index`
pub fn array_element_key(index: U256) -> Result<StorageKey, RegistryError> {
    if index > U256::from(u128::MAX) {
        return Err(RegistryError::IndexOverflow);
    }
    let index_bytes = index.to_be_bytes::<{ U256::BYTES }>();

    let mut key = [0u8; NUM_BYTES_STORAGE_KEY];
    key[..NUM_BYTES_ARRAY_PREFIX].copy_from_slice(ADDRESS_PERMISSIONS_ARRAY_INDEX_PREFIX.as_slice());
    key[NUM_BYTES_ARRAY_PREFIX..].copy_from_slice(&index_bytes[U256::BYTES - NUM_BYTES_ARRAY_INDEX..]);

    // The element prefix is the first half of the length key
    let key = B256::from(key);
    if key == ADDRESS_PERMISSIONS_ARRAY_LENGTH_KEY {
        return Err(RegistryError::IndexCollision);
    }

    Ok(key)
}

// ----------
// | VALUES |
// ----------

/// Encode an array length as the 16-byte big-endian value LSP6 accepts
pub fn encode_array_length(length: u128) -> Bytes {
    Bytes::copy_from_slice(&length.to_be_bytes())
}

/// Decode a stored array length.
///
/// An unset key reads back as empty and means an empty array. Both the 16-byte
/// encoding and a full 32-byte word are accepted.
pub fn decode_array_length(value: &[u8]) -> Result<u128, RegistryError> {
    match value.len() {
        0 => Ok(0),
        NUM_BYTES_ARRAY_INDEX => {
            let mut bytes = [0u8; NUM_BYTES_ARRAY_INDEX];
            bytes.copy_from_slice(value);
            Ok(u128::from_be_bytes(bytes))
        }
        NUM_BYTES_STORAGE_KEY => {
            let (high, low) = value.split_at(NUM_BYTES_STORAGE_KEY - NUM_BYTES_ARRAY_INDEX);
            if high.iter().any(|b| *b != 0) {
                return Err(RegistryError::IndexOverflow);
            }
            decode_array_length(low)
        }
        len => Err(RegistryError::MalformedArrayLength(len)),
    }
}

/// Encode an address as the packed 20-byte value stored under a delegate or
/// array element key
pub fn encode_address(address: Address) -> Bytes {
    Bytes::copy_from_slice(address.as_slice())
}

/// Decode an address stored either packed (20 bytes) or ABI-padded (32 bytes)
pub fn decode_address(value: &[u8]) -> Result<Address, RegistryError> {
    match value.len() {
        NUM_BYTES_ADDRESS => Ok(Address::from_slice(value)),
        NUM_BYTES_STORAGE_KEY => Ok(Address::from_slice(
            &value[NUM_BYTES_STORAGE_KEY - NUM_BYTES_ADDRESS..],
        )),
        len => Err(RegistryError::MalformedAddress(len)),
    }
}
