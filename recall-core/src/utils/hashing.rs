//! Hashing Utilities

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

/// Per-process counter mixed into memory ids
static ID_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Compute the MD5 digest of a string as lowercase hex
pub fn md5_hex(content: &str) -> String {
    format!("{:x}", md5::compute(content.as_bytes()))
}

/// Generate an id for a memory created at `timestamp`
pub fn memory_id(content: &str, timestamp: f64) -> String {
    let seq = ID_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    md5_hex(&format!("{content}{timestamp}#{seq}"))
}

/// Storage key for a project root
pub fn path_key(project_root: &Path) -> String {
    md5_hex(&project_root.to_string_lossy())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_md5() {
        assert_eq!(md5_hex("hello"), "5d41402abc4b2a76b9719d911017c592");
    }

    #[test]
    fn test_memory_id_unique_for_same_input() {
        let a = memory_id("same", 1.0);
        let b = memory_id("same", 1.0);
        assert_eq!(a.len(), 32);
        assert_ne!(a, b);
    }

    #[test]
    fn test_path_key_is_deterministic() {
        let a = path_key(Path::new("/work/app"));
        let b = path_key(Path::new("/work/app"));
        assert_eq!(a, b);
        assert_ne!(a, path_key(Path::new("/work/other")));
    }
}
