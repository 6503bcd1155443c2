use base64::Engine;
use uuid::Uuid;

/// Length of a generated document ID (9 random bytes, base64url without padding).
pub const DOCUMENT_ID_LENGTH: usize = 12;

/// Upper bound accepted for IDs arriving in request paths.
const MAX_DOCUMENT_ID_LENGTH: usize = 64;

/// Generates a new random, URL-safe document ID.
///
/// Uniqueness is not checked here; callers insert and retry on collision.
pub fn new_document_id() -> String {
    let bytes = Uuid::new_v4().into_bytes();

    // Skip byte 6 (version) and byte 8 (variant), which are not fully random
    let mut random = [0u8; DOCUMENT_ID_LENGTH / 4 * 3];
    random[..6].copy_from_slice(&bytes[..6]);
    random[6..].copy_from_slice(&bytes[9..12]);

    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(random)
}

/// Cheap shape check for IDs taken from a request path.
pub fn is_valid_document_id(document_id: &str) -> bool {
    !document_id.is_empty()
        && document_id.len() <= MAX_DOCUMENT_ID_LENGTH
        && document_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
