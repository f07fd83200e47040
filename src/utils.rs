use crate::types::LogNamespace;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

const MAX_DIR_NAME_LEN: usize = 100;
const HASH_SUFFIX_LEN: usize = 16;

/// Turn a test name into a directory name.
///
/// Anything outside `[A-Za-z0-9._-]` becomes `-`. Long names are cut and get a
/// hash of the full name appended so that distinct tests stay distinct.
pub fn test_dir_name(test_name: &str) -> String {
    let sanitized: String = test_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect();

    if sanitized.len() <= MAX_DIR_NAME_LEN {
        return sanitized;
    }

    let digest = Sha256::digest(test_name.as_bytes());
    let hash: String = digest
        .iter()
        .take(HASH_SUFFIX_LEN / 2)
        .map(|b| format!("{:02x}", b))
        .collect();
    // sanitized is pure ASCII, byte slicing is safe
    format!("{}-{}", &sanitized[..MAX_DIR_NAME_LEN], hash)
}

/// Parse `Label=namespace`. A bare namespace is its own label.
pub fn parse_namespace(spec: &str) -> Result<LogNamespace, String> {
    let spec = spec.trim();
    let (label, namespace) = match spec.find('=') {
        Some(eq_pos) => (spec[..eq_pos].trim(), spec[eq_pos + 1..].trim()),
        None => (spec, spec),
    };
    if namespace.is_empty() {
        return Err(format!("empty namespace in '{}'", spec));
    }
    let label = if label.is_empty() { namespace } else { label };
    Ok(LogNamespace::new(label, namespace))
}

/// Parse an RFC 3339 timestamp given on the command line.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| format!("invalid RFC 3339 timestamp '{}': {}", value, e))
}
