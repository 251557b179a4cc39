//! Change detection for polling clients
//!
//! The display board and the staff dashboard poll a few times a minute. Each
//! response carries a content hash; the client echoes it back and the server
//! skips the payload when nothing changed.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::{AppError, AppResult};

/// Payload wrapper with the content hash and a changed flag. `data` is None
/// when the client's previous hash still matches.
#[derive(Debug, Serialize)]
pub struct HashedPayload<T> {
    pub hash: String,
    pub changed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// Hex SHA-256 of the canonical JSON serialization
pub fn content_hash<T: Serialize>(value: &T) -> AppResult<String> {
    let bytes = serde_json::to_vec(value)
        .map_err(|e| AppError::Internal(format!("Failed to serialize payload: {}", e)))?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}

/// Wrap a payload, omitting the data when the client already has it
pub fn with_change_detection<T: Serialize>(
    data: T,
    previous_hash: Option<&str>,
) -> AppResult<HashedPayload<T>> {
    let hash = content_hash(&data)?;
    if previous_hash == Some(hash.as_str()) {
        Ok(HashedPayload {
            hash,
            changed: false,
            data: None,
        })
    } else {
        Ok(HashedPayload {
            hash,
            changed: true,
            data: Some(data),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_stable_for_equal_payloads() {
        let a = content_hash(&vec![1, 2, 3]).unwrap();
        let b = content_hash(&vec![1, 2, 3]).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn hash_differs_when_content_differs() {
        let a = content_hash(&vec![1, 2, 3]).unwrap();
        let b = content_hash(&vec![1, 2, 4]).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn unchanged_payload_is_omitted() {
        let first = with_change_detection(vec!["a", "b"], None).unwrap();
        assert!(first.changed);
        assert!(first.data.is_some());

        let second = with_change_detection(vec!["a", "b"], Some(&first.hash)).unwrap();
        assert!(!second.changed);
        assert!(second.data.is_none());
        assert_eq!(second.hash, first.hash);
    }

    #[test]
    fn stale_hash_returns_fresh_payload() {
        let wrapped = with_change_detection(vec!["a"], Some("deadbeef")).unwrap();
        assert!(wrapped.changed);
        assert!(wrapped.data.is_some());
    }
}
