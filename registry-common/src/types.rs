//! Common types used throughout the registry

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
    str::FromStr,
};

use alloy_primitives::{keccak256, B256};

/// Type alias for an ERC725Y data key
pub type StorageKey = B256;

/// The LSP1 notification types a Universal Receiver Delegate can be registered for.
///
/// The type id of each notification is the keccak hash of its name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NotificationType {
    /// The account received native value
    Lsp0ValueReceived,
    /// An ownership transfer of the account was started
    Lsp0OwnershipTransferStarted,
    /// The account transferred ownership of a contract
    Lsp0OwnershipTransferredSender,
    /// The account received ownership of a contract
    Lsp0OwnershipTransferredRecipient,
    /// The account sent LSP7 tokens
    Lsp7TokensSender,
    /// The account received LSP7 tokens
    Lsp7TokensRecipient,
    /// The account was made an operator of LSP7 tokens
    Lsp7TokensOperator,
    /// The account sent an LSP8 token
    Lsp8TokensSender,
    /// The account received an LSP8 token
    Lsp8TokensRecipient,
    /// The account was made an operator of an LSP8 token
    Lsp8TokensOperator,
}

impl NotificationType {
    /// Every known notification type
    pub const ALL: [NotificationType; 10] = [
        NotificationType::Lsp0ValueReceived,
        NotificationType::Lsp0OwnershipTransferStarted,
        NotificationType::Lsp0OwnershipTransferredSender,
        NotificationType::Lsp0OwnershipTransferredRecipient,
        NotificationType::Lsp7TokensSender,
        NotificationType::Lsp7TokensRecipient,
        NotificationType::Lsp7TokensOperator,
        NotificationType::Lsp8TokensSender,
        NotificationType::Lsp8TokensRecipient,
        NotificationType::Lsp8TokensOperator,
    ];

    /// The canonical name of the notification type
    pub fn name(&self) -> &'static str {
        match self {
            NotificationType::Lsp0ValueReceived => "LSP0ValueReceived",
            NotificationType::Lsp0OwnershipTransferStarted => "LSP0OwnershipTransferStarted",
            NotificationType::Lsp0OwnershipTransferredSender => {
                "LSP0OwnershipTransferred_SenderNotification"
            }
            NotificationType::Lsp0OwnershipTransferredRecipient => {
                "LSP0OwnershipTransferred_RecipientNotification"
            }
            NotificationType::Lsp7TokensSender => "LSP7Tokens_SenderNotification",
            NotificationType::Lsp7TokensRecipient => "LSP7Tokens_RecipientNotification",
            NotificationType::Lsp7TokensOperator => "LSP7Tokens_OperatorNotification",
            NotificationType::Lsp8TokensSender => "LSP8Tokens_SenderNotification",
            NotificationType::Lsp8TokensRecipient => "LSP8Tokens_RecipientNotification",
            NotificationType::Lsp8TokensOperator => "LSP8Tokens_OperatorNotification",
        }
    }

    /// The 32-byte type id passed to `universalReceiver` for this notification
    pub fn type_id(&self) -> B256 {
        keccak256(self.name())
    }
}

impl Display for NotificationType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for NotificationType {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NotificationType::ALL
            .into_iter()
            .find(|n| n.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownName(s.to_string()))
    }
}

/// Error returned when parsing a name that does not correspond to a known
/// protocol constant
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownName(pub String);

impl Display for UnknownName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "unknown name: {}", self.0)
    }
}

impl Error for UnknownName {}
