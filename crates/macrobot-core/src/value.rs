use serde::{Deserialize, Serialize};

use crate::message::FileReference;

/// Content a macro resolves to. Immutable once created.
///
/// A link macro carries a single URL; an attachment macro carries every
/// file attached to its defining message as one set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MacroValue {
    Link { url: String },
    AttachmentSet { files: Vec<FileReference> },
}

impl MacroValue {
    pub fn link(url: impl Into<String>) -> Self {
        Self::Link { url: url.into() }
    }

    pub fn attachment_set(files: Vec<FileReference>) -> Self {
        Self::AttachmentSet { files }
    }
}
