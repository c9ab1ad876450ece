//! Deployment and registration of Universal Receiver Delegates on LSP0
//! accounts.

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod backend;
pub mod cli;
mod commands;
pub mod config;
pub mod constants;
pub mod errors;
pub mod lsp0;
pub mod orchestrator;
mod solidity;
pub mod utils;
