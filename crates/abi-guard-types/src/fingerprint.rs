use serde::Serialize;

/// Emit a value as JCS-canonical JSON (RFC 8785): deterministic key order and
/// number formatting regardless of struct field order or serializer internals.
pub fn emit_jcs<T: Serialize>(value: &T) -> Result<String, FingerprintError> {
    let json_value = serde_json::to_value(value)?;
    let bytes = serde_json_canonicalizer::to_vec(&json_value)
        .map_err(|e| FingerprintError::Canonicalize(e.to_string()))?;
    Ok(String::from_utf8(bytes).expect("JCS output is always valid UTF-8"))
}

#[derive(Debug, thiserror::Error)]
pub enum FingerprintError {
    #[error("failed to serialize value to JSON: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to canonicalize JSON: {0}")]
    Canonicalize(String),
}

/// Deterministic content hash used for enum/struct fingerprints and IDL
/// `stable_id`/`content_fingerprint` values: JCS-canonicalize then blake3.
///
/// Panics only if `value` cannot be represented as JSON at all, which would
/// indicate a non-serializable type bug rather than a runtime condition.
#[must_use]
pub fn stable_hash<T: Serialize>(value: &T) -> String {
    let canonical = emit_jcs(value).expect("fingerprinted values must be JSON-serializable");
    blake3::hash(canonical.as_bytes()).to_hex().to_string()
}
