//! Constants that parameterize the ERC725Y key layouts used by the registry

use alloy_primitives::{b256, fixed_bytes, FixedBytes, B256};

// --------------
// | KEY WIDTHS |
// --------------

/// The number of bytes in an ERC725Y data key
pub const NUM_BYTES_STORAGE_KEY: usize = 32;

/// The number of bytes it takes to represent an Ethereum address
pub const NUM_BYTES_ADDRESS: usize = 20;

/// The number of bytes of a notification type id that are kept in a mapping key.
///
/// Changing this breaks compatibility with every LSP2 reader, since the account
/// looks the delegate up under exactly this slice of the type id.
pub const NUM_BYTES_DISCRIMINATOR: usize = 20;

/// The number of bytes in the first word of an LSP2 `Mapping` key
pub const NUM_BYTES_MAPPING_PREFIX: usize = 10;

/// The number of zero bytes separating the first word of an LSP2 `Mapping` key
/// from its second word
pub const NUM_BYTES_MAPPING_SEPARATOR: usize = 2;

/// The number of bytes in the prefix of an LSP2 `MappingWithGrouping` key,
/// including the trailing zero bytes
pub const NUM_BYTES_GROUPING_PREFIX: usize = 12;

/// The number of bytes in the prefix of an LSP2 `Array` element key
pub const NUM_BYTES_ARRAY_PREFIX: usize = 16;

/// The number of bytes used to encode an array index in an element key,
/// and an array length in the length value
pub const NUM_BYTES_ARRAY_INDEX: usize = 16;

/// The number of bytes in an LSP6 permission value
pub const NUM_BYTES_PERMISSIONS: usize = 32;

/// The number of bits in an LSP6 permission value
pub const NUM_PERMISSION_BITS: usize = NUM_BYTES_PERMISSIONS * 8;

// --------------------
// | LSP1 / LSP6 KEYS |
// --------------------

/// The first word of the `LSP1UniversalReceiverDelegate:<bytes32>` mapping key,
/// i.e. `bytes10(keccak256("LSP1UniversalReceiverDelegate"))`
pub const LSP1_DELEGATE_PREFIX: FixedBytes<NUM_BYTES_MAPPING_PREFIX> =
    fixed_bytes!("0cfc51aec37c55a4d0b1");

/// The key name hashed into [`LSP1_DELEGATE_PREFIX`]
pub const LSP1_DELEGATE_KEY_NAME: &str = "LSP1UniversalReceiverDelegate";

/// The prefix of the `AddressPermissions:Permissions:<address>` key, i.e.
/// `bytes6(keccak256("AddressPermissions")) ++ bytes4(keccak256("Permissions")) ++ 0x0000`
pub const ADDRESS_PERMISSIONS_PREFIX: FixedBytes<NUM_BYTES_GROUPING_PREFIX> =
    fixed_bytes!("4b80742de2bf82acb3630000");

/// The first key name hashed into [`ADDRESS_PERMISSIONS_PREFIX`]
pub const ADDRESS_PERMISSIONS_KEY_NAME: &str = "AddressPermissions";

/// The second key name hashed into [`ADDRESS_PERMISSIONS_PREFIX`]
pub const PERMISSIONS_KEY_NAME: &str = "Permissions";

/// The key holding the length of the `AddressPermissions[]` array,
/// i.e. `keccak256("AddressPermissions[]")`
pub const ADDRESS_PERMISSIONS_ARRAY_LENGTH_KEY: B256 =
    b256!("df30dba06db6a30e65354d9a64c609861f089545ca58c6b4dbe31a5f338cb0e3");

/// The key name hashed into [`ADDRESS_PERMISSIONS_ARRAY_LENGTH_KEY`]
pub const ADDRESS_PERMISSIONS_ARRAY_KEY_NAME: &str = "AddressPermissions[]";

/// The prefix of an `AddressPermissions[]` element key, the first half of
/// [`ADDRESS_PERMISSIONS_ARRAY_LENGTH_KEY`]
pub const ADDRESS_PERMISSIONS_ARRAY_INDEX_PREFIX: FixedBytes<NUM_BYTES_ARRAY_PREFIX> =
    fixed_bytes!("df30dba06db6a30e65354d9a64c60986");

// ----------------------
// | ERC725X OPERATIONS |
// ----------------------

/// The ERC725X operation type for a regular call
pub const OPERATION_CALL: u8 = 0;

/// The ERC725X operation type for a contract creation with `CREATE`
pub const OPERATION_CREATE: u8 = 1;

/// The ERC725X operation type for a contract creation with `CREATE2`
pub const OPERATION_CREATE2: u8 = 2;

/// The ERC725X operation type for a static call
pub const OPERATION_STATICCALL: u8 = 3;

/// The number of bytes in a `CREATE2` salt, appended to the init code
/// passed to ERC725X `execute`
pub const NUM_BYTES_CREATE2_SALT: usize = 32;
