use serde::{Deserialize, Serialize};

use crate::ids::MessageId;

/// Largest page the remote message store will return per fetch.
pub const MAX_PAGE_SIZE: usize = 100;

/// Opaque handle to a file attached to a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReference {
    pub id: String,
    pub filename: String,
    pub url: String,
}

/// One message as seen by the scanner: its identifier, text content,
/// and attached files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMessage {
    pub id: MessageId,
    pub text: String,
    pub attachments: Vec<FileReference>,
}

/// Bounds for one page fetch. `before` and `after` are exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageQuery {
    pub limit: usize,
    pub before: Option<MessageId>,
    pub after: Option<MessageId>,
}
