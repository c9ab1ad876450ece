//! Core registration logic: key derivation, permission algebra, address
//! prediction and batch composition, defined agnostically of any RPC client

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod address;
pub mod batch;
pub mod errors;
pub mod keys;
pub mod permissions;
