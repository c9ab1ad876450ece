//! The LSP6 permission algebra.
//!
//! A permission value is a 32-byte bitmask where each bit grants a capability.
//! Masks are only ever combined with bitwise OR, so that no set bit from any
//! input can be cleared by composition.

use std::{
    fmt::{self, Display, Formatter},
    ops::{BitOr, BitOrAssign},
    str::FromStr,
};

use alloy_primitives::{hex, Bytes, B256, U256};
use itertools::Itertools;
use registry_common::{
    constants::{NUM_BYTES_PERMISSIONS, NUM_PERMISSION_BITS},
    types::UnknownName,
};

use crate::errors::RegistryError;

/// A named LSP6 capability. The discriminant is the index of its bit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Permission {
    /// Transfer ownership of the account
    ChangeOwner = 0,
    /// Grant permissions to a new controller
    AddController = 1,
    /// Change the permissions of an existing controller
    EditPermissions = 2,
    /// Register a new LSP17 extension
    AddExtensions = 3,
    /// Change an existing LSP17 extension
    ChangeExtensions = 4,
    /// Register a new Universal Receiver Delegate
    AddUniversalReceiverDelegate = 5,
    /// Change an existing Universal Receiver Delegate
    ChangeUniversalReceiverDelegate = 6,
    /// Call back into the account while it is executing
    Reentrancy = 7,
    /// Transfer value to any address
    SuperTransferValue = 8,
    /// Transfer value to allowed addresses
    TransferValue = 9,
    /// Call any contract
    SuperCall = 10,
    /// Call allowed contracts
    Call = 11,
    /// Static call any contract
    SuperStaticCall = 12,
    /// Static call allowed contracts
    StaticCall = 13,
    /// Delegate call any contract
    SuperDelegateCall = 14,
    /// Delegate call allowed contracts
    DelegateCall = 15,
    /// Deploy contracts from the account
    Deploy = 16,
    /// Set any data key
    SuperSetData = 17,
    /// Set allowed data keys
    SetData = 18,
    /// Encrypt data
    Encrypt = 19,
    /// Decrypt data
    Decrypt = 20,
    /// Sign messages on behalf of the account
    Sign = 21,
    /// Execute relayed calls
    ExecuteRelayCall = 22,
}

impl Permission {
    /// Every named permission, in bit order
    pub const ALL: [Permission; 23] = [
        Permission::ChangeOwner,
        Permission::AddController,
        Permission::EditPermissions,
        Permission::AddExtensions,
        Permission::ChangeExtensions,
        Permission::AddUniversalReceiverDelegate,
        Permission::ChangeUniversalReceiverDelegate,
        Permission::Reentrancy,
        Permission::SuperTransferValue,
        Permission::TransferValue,
        Permission::SuperCall,
        Permission::Call,
        Permission::SuperStaticCall,
        Permission::StaticCall,
        Permission::SuperDelegateCall,
        Permission::DelegateCall,
        Permission::Deploy,
        Permission::SuperSetData,
        Permission::SetData,
        Permission::Encrypt,
        Permission::Decrypt,
        Permission::Sign,
        Permission::ExecuteRelayCall,
    ];

    /// The index of the bit this permission occupies
    pub fn bit(&self) -> usize {
        *self as usize
    }

    /// The canonical LSP6 name of the permission
    pub fn name(&self) -> &'static str {
        match self {
            Permission::ChangeOwner => "CHANGEOWNER",
            Permission::AddController => "ADDCONTROLLER",
            Permission::EditPermissions => "EDITPERMISSIONS",
            Permission::AddExtensions => "ADDEXTENSIONS",
            Permission::ChangeExtensions => "CHANGEEXTENSIONS",
            Permission::AddUniversalReceiverDelegate => "ADDUNIVERSALRECEIVERDELEGATE",
            Permission::ChangeUniversalReceiverDelegate => "CHANGEUNIVERSALRECEIVERDELEGATE",
            Permission::Reentrancy => "REENTRANCY",
            Permission::SuperTransferValue => "SUPER_TRANSFERVALUE",
            Permission::TransferValue => "TRANSFERVALUE",
            Permission::SuperCall => "SUPER_CALL",
            Permission::Call => "CALL",
            Permission::SuperStaticCall => "SUPER_STATICCALL",
            Permission::StaticCall => "STATICCALL",
            Permission::SuperDelegateCall => "SUPER_DELEGATECALL",
            Permission::DelegateCall => "DELEGATECALL",
            Permission::Deploy => "DEPLOY",
            Permission::SuperSetData => "SUPER_SETDATA",
            Permission::SetData => "SETDATA",
            Permission::Encrypt => "ENCRYPT",
            Permission::Decrypt => "DECRYPT",
            Permission::Sign => "SIGN",
            Permission::ExecuteRelayCall => "EXECUTE_RELAY_CALL",
        }
    }
}

impl Display for Permission {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Permission {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownName(s.to_string()))
    }
}

/// A 32-byte LSP6 permission bitmask
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PermissionMask(U256);

impl PermissionMask {
    /// The mask granting nothing
    pub const NONE: PermissionMask = PermissionMask(U256::ZERO);

    /// A mask with only the given bit set, or `None` if the bit does not fit
    /// in a permission value
    pub fn from_bit(bit: usize) -> Option<Self> {
        (bit < NUM_PERMISSION_BITS).then(|| PermissionMask(U256::from(1) << bit))
    }

    /// The bitwise OR of all the given masks
    pub fn combine<I: IntoIterator<Item = PermissionMask>>(masks: I) -> Self {
        masks.into_iter().fold(Self::NONE, |acc, mask| acc | mask)
    }

    /// Whether the given permission is granted by this mask
    pub fn has(&self, permission: Permission) -> bool {
        self.0.bit(permission.bit())
    }

    /// Whether no bit is set
    pub fn is_empty(&self) -> bool {
        self.0.is_zero()
    }

    /// The named permissions granted by this mask, in bit order
    pub fn permissions(&self) -> Vec<Permission> {
        Permission::ALL
            .into_iter()
            .filter(|p| self.has(*p))
            .collect()
    }

    /// The bits set in this mask that have no named permission
    pub fn unknown_bits(&self) -> PermissionMask {
        let named = PermissionMask::from_iter(Permission::ALL);
        PermissionMask(self.0 & !named.0)
    }

    /// A human readable listing of the granted permissions
    pub fn describe(&self) -> String {
        let names = self.permissions().iter().map(Permission::name).join(", ");
        let unknown = self.unknown_bits();

        match (names.is_empty(), unknown.is_empty()) {
            (true, true) => "none".to_string(),
            (false, true) => names,
            (true, false) => format!("unknown bits {unknown}"),
            (false, false) => format!("{names}, unknown bits {unknown}"),
        }
    }

    /// The mask as a 32-byte big-endian word
    pub fn to_word(&self) -> B256 {
        B256::from(self.0.to_be_bytes::<NUM_BYTES_PERMISSIONS>())
    }

    /// The mask as the value written under a permissions key
    pub fn to_bytes(&self) -> Bytes {
        Bytes::copy_from_slice(self.to_word().as_slice())
    }

    /// Decode a stored permission value.
    ///
    /// An unset key reads back as empty and grants nothing. Values shorter than
    /// 32 bytes are interpreted as big-endian integers.
    pub fn from_bytes(value: &[u8]) -> Result<Self, RegistryError> {
        if value.len() > NUM_BYTES_PERMISSIONS {
            return Err(RegistryError::MalformedPermissions(value.len()));
        }

        Ok(PermissionMask(U256::from_be_slice(value)))
    }
}

impl From<Permission> for PermissionMask {
    fn from(permission: Permission) -> Self {
        PermissionMask(U256::from(1) << permission.bit())
    }
}

impl From<B256> for PermissionMask {
    fn from(word: B256) -> Self {
        PermissionMask(U256::from_be_bytes(word.0))
    }
}

impl FromIterator<Permission> for PermissionMask {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        PermissionMask::combine(iter.into_iter().map(PermissionMask::from))
    }
}

impl BitOr for PermissionMask {
    type Output = PermissionMask;

    fn bitor(self, rhs: Self) -> Self::Output {
        PermissionMask(self.0 | rhs.0)
    }
}

impl BitOrAssign for PermissionMask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl Display for PermissionMask {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode_prefixed(self.to_word()))
    }
}
