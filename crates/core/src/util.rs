use xxhash_rust::xxh3::xxh3_64;

/// Content hash used for vocabulary keys and compacted paths.
pub fn hash_text(text: &str) -> u64 {
    xxh3_64(text.as_bytes())
}

/// Grammar ids are rendered as fixed-width 3-digit strings so that a
/// concatenated path can be split back into ids.
pub fn pad_id(id: u16) -> String {
    format!("{id:0>3}")
}
