//! Composition of the key/value batch written in a single `setDataBatch`

use alloy_primitives::{Address, Bytes, U256};
use registry_common::{
    constants::{ADDRESS_PERMISSIONS_ARRAY_INDEX_PREFIX, NUM_BYTES_ARRAY_PREFIX},
    types::StorageKey,
};

use crate::{
    errors::RegistryError,
    keys::{
        array_element_key, array_length_key, decode_address, decode_array_length, delegate_key,
        encode_address, encode_array_length, permissions_key,
    },
    permissions::PermissionMask,
};

/// The set of keys a registration writes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BatchLayout {
    /// Only register the delegate for the notification type
    DelegateOnly,
    /// Register the delegate and grant it permissions
    Simple,
    /// Register the delegate, grant it permissions and append it to the
    /// permission-holder array
    Indexed {
        /// The length of the permission-holder array read before composition
        current_length: u128,
    },
}

/// An ordered set of data key writes, submitted as one indivisible batch.
///
/// Keys are unique: inserting a key that is already present replaces its value
/// in place. Batches are only built by [`compose_batch`], which checks the
/// permission-holder array bookkeeping before handing one out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegistrationBatch {
    /// The key/value pairs, in insertion order
    entries: Vec<(StorageKey, Bytes)>,
    /// The checked permission-holder array update
    array_append: Option<ArrayAppend>,
}

/// The permission-holder array update carried by a batch
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArrayAppend {
    /// The index written, equal to the array length before the batch
    pub index: u128,
    /// The address stored at `index`
    pub element: Address,
}

impl RegistrationBatch {
    /// An empty batch
    fn new() -> Self {
        Self {
            entries: Vec::new(),
            array_append: None,
        }
    }

    /// Write `value` under `key`, replacing any previous write to the same key
    fn insert(&mut self, key: StorageKey, value: Bytes) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((key, value)),
        }
    }

    /// The value written under `key`, if any
    pub fn get(&self, key: &StorageKey) -> Option<&Bytes> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Whether the batch writes `key`
    pub fn contains_key(&self, key: &StorageKey) -> bool {
        self.get(key).is_some()
    }

    /// The number of writes in the batch
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the batch writes nothing
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the writes in order
    pub fn iter(&self) -> impl Iterator<Item = &(StorageKey, Bytes)> {
        self.entries.iter()
    }

    /// The keys written, in order
    pub fn keys(&self) -> Vec<StorageKey> {
        self.entries.iter().map(|(k, _)| *k).collect()
    }

    /// The permission-holder array update, `None` if the batch does not touch
    /// the array
    pub fn array_append(&self) -> Option<ArrayAppend> {
        self.array_append
    }

    /// Split the batch into the parallel key and value arrays `setDataBatch` expects
    pub fn into_parts(self) -> (Vec<StorageKey>, Vec<Bytes>) {
        self.entries.into_iter().unzip()
    }

    /// Check the permission-holder array bookkeeping of the writes.
    ///
    /// Returns `None` if the batch does not touch the array. Otherwise the
    /// batch must write the length key and exactly one element key, whose
    /// index is the new length minus one.
    fn check_array_append(&self) -> Result<Option<ArrayAppend>, RegistryError> {
        let length_key = array_length_key();
        let length = self.get(&length_key);
        let elements: Vec<_> = self
            .entries
            .iter()
            .filter(|(k, _)| {
                *k != length_key
                    && k[..NUM_BYTES_ARRAY_PREFIX] == ADDRESS_PERMISSIONS_ARRAY_INDEX_PREFIX[..]
            })
            .collect();

        let (new_length, (element_key, element_value)) = match (length, elements.as_slice()) {
            (None, []) => return Ok(None),
            (Some(length), [element]) => (decode_array_length(length)?, element),
            _ => return Err(RegistryError::InconsistentArrayUpdate),
        };

        let index = new_length
            .checked_sub(1)
            .ok_or(RegistryError::InconsistentArrayUpdate)?;
        if array_element_key(U256::from(index))? != *element_key {
            return Err(RegistryError::InconsistentArrayUpdate);
        }

        Ok(Some(ArrayAppend {
            index,
            element: decode_address(element_value)?,
        }))
    }
}

impl IntoIterator for RegistrationBatch {
    type Item = (StorageKey, Bytes);
    type IntoIter = std::vec::IntoIter<(StorageKey, Bytes)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Compose the batch registering `delegate` for `notification_type`.
///
/// Writes are ordered: delegate key, then the array length and element keys
/// if the layout is indexed, then the permissions key.
pub fn compose_batch(
    delegate: Address,
    notification_type: &[u8],
    permissions: PermissionMask,
    layout: BatchLayout,
) -> Result<RegistrationBatch, RegistryError> {
    let mut batch = RegistrationBatch::new();
    batch.insert(delegate_key(notification_type)?, encode_address(delegate));

    if let BatchLayout::Indexed { current_length } = layout {
        let new_length = current_length
            .checked_add(1)
            .ok_or(RegistryError::IndexOverflow)?;
        let element_key = array_element_key(U256::from(current_length))?;

        batch.insert(array_length_key(), encode_array_length(new_length));
        batch.insert(element_key, encode_address(delegate));
    }

    if layout != BatchLayout::DelegateOnly {
        batch.insert(permissions_key(delegate), permissions.to_bytes());
    }

    batch.array_append = batch.check_array_append()?;
    Ok(batch)
}
