//! Formatting utilities

use std::collections::HashSet;

use humansize::{DECIMAL, format_size};

/// Format file size in human-readable format
pub fn format_bytes(bytes: u64) -> String {
    format_size(bytes, DECIMAL)
}

/// Format a duration given in seconds
pub fn format_seconds(seconds: f32) -> String {
    format!("{seconds:.3}s")
}

/// Replace characters that are awkward in file names
pub fn sanitize_file_stem(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if stem.is_empty() || stem.chars().all(|c| c == '.') {
        "clip".to_string()
    } else {
        stem
    }
}

/// A sanitized stem for `name` that is not in `taken` yet, compared without
/// case. Repeats get a numeric suffix starting at 2.
pub fn unique_file_stem(name: &str, taken: &mut HashSet<String>) -> String {
    let base = sanitize_file_stem(name);
    let mut stem = base.clone();
    let mut suffix = 2;
    while !taken.insert(stem.to_lowercase()) {
        stem = format!("{base}_{suffix}");
        suffix += 1;
    }
    stem
}
