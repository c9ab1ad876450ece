//! Protocol constants and types shared by the registry engine, the account
//! management scripts & testing code

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod constants;
pub mod types;
