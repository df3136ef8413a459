use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Marker identifying a wallet-dashboard storage file.
pub const FORMAT_TAG: &str = "wallet-dashboard/storage";

/// Current storage format version.
pub const CURRENT_VERSION: u16 = 1;

/// On-disk key/value document.
///
/// ```text
/// { "format": "wallet-dashboard/storage", "version": 1, "entries": { "token": "..." } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageDocument {
    pub format: String,
    pub version: u16,
    #[serde(default)]
    pub entries: BTreeMap<String, String>,
}

impl Default for StorageDocument {
    fn default() -> Self {
        Self {
            format: FORMAT_TAG.to_string(),
            version: CURRENT_VERSION,
            entries: BTreeMap::new(),
        }
    }
}

/// Serialize a document to pretty-printed JSON bytes.
pub fn write_document(doc: &StorageDocument) -> Result<Vec<u8>, CoreError> {
    serde_json::to_vec_pretty(doc)
        .map_err(|e| CoreError::Serialization(format!("Failed to serialize storage: {e}")))
}

/// Parse and validate a document. Empty input is an empty document.
pub fn read_document(data: &[u8]) -> Result<StorageDocument, CoreError> {
    if data.iter().all(u8::is_ascii_whitespace) {
        return Ok(StorageDocument::default());
    }

    let doc: StorageDocument = serde_json::from_slice(data)
        .map_err(|e| CoreError::InvalidStorage(format!("not a storage document: {e}")))?;

    if doc.format != FORMAT_TAG {
        return Err(CoreError::InvalidStorage(format!(
            "unexpected format tag {:?}",
            doc.format
        )));
    }
    if doc.version == 0 || doc.version > CURRENT_VERSION {
        return Err(CoreError::UnsupportedVersion(doc.version));
    }

    Ok(doc)
}
