//! Filesystem-safe filename sanitization.

/// Character substituted for every forbidden character.
pub const REPLACEMENT: char = '-';

/// Prefix added to names that collide with a reserved device name.
pub const RESERVED_PREFIX: &str = "file_";

const RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Returns true for characters that may not appear in a filename on any
/// target filesystem: path separators, `: * ? " < > |` and control chars 0-31.
pub fn is_forbidden(c: char) -> bool {
    matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') || (c as u32) < 32
}

/// Sanitizes a requested display name for use as a filename.
///
/// - Replaces every forbidden character with [`REPLACEMENT`]
/// - Trims leading/trailing dots and spaces
/// - Prefixes [`RESERVED_PREFIX`] when the name without extension is a
///   reserved device name (`CON`, `com1.mp3`, ...)
///
/// Pure and idempotent: `sanitize(&sanitize(s)) == sanitize(s)`.
pub fn sanitize(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| if is_forbidden(c) { REPLACEMENT } else { c })
        .collect();

    let trimmed = replaced.trim_matches(|c| c == '.' || c == ' ');

    if is_reserved(trimmed) {
        format!("{RESERVED_PREFIX}{trimmed}")
    } else {
        trimmed.to_string()
    }
}

fn is_reserved(name: &str) -> bool {
    let base = match name.rfind('.') {
        Some(i) if i > 0 => &name[..i],
        _ => name,
    };
    let upper = base.to_ascii_uppercase();
    RESERVED_NAMES.contains(&upper.as_str())
}

/// Portion of a filename before the first dot; the key used to match
/// produced files back to jobs.
pub fn stem(name: &str) -> &str {
    name.split('.').next().unwrap_or(name)
}
