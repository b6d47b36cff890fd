//! Content fingerprints.
//!
//! A fingerprint is the lowercase hex SHA-256 of a file's bytes. It is only
//! used to detect change, never as a security primitive.

use sha2::{Digest, Sha256};
use std::fs::File;
use std::io;
use std::path::Path;

/// Hex length of a fingerprint.
pub const CHECKSUM_HEX_LEN: usize = 64;

/// Fingerprint an in-memory byte slice.
pub fn fingerprint(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}

/// Fingerprint a file by streaming it through the hasher.
///
/// Returns the checksum and the number of bytes hashed.
pub fn fingerprint_file(path: &Path) -> io::Result<(String, u64)> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let size = io::copy(&mut file, &mut hasher)?;
    Ok((format!("{:x}", hasher.finalize()), size))
}

/// Whether `value` looks like a fingerprint (64 hex digits, any case).
pub fn is_valid_checksum(value: &str) -> bool {
    value.len() == CHECKSUM_HEX_LEN && value.bytes().all(|b| b.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_fingerprint_known_value() {
        assert_eq!(
            fingerprint(b"hello"),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn test_fingerprint_file_matches_in_memory() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"fn main() {}\n").unwrap();

        let (first, size) = fingerprint_file(file.path()).unwrap();
        let (second, _) = fingerprint_file(file.path()).unwrap();

        assert_eq!(first, second);
        assert_eq!(first, fingerprint(b"fn main() {}\n"));
        assert_eq!(size, 13);
        assert!(is_valid_checksum(&first));
    }

    #[test]
    fn test_fingerprint_differs_on_change() {
        assert_ne!(fingerprint(b"hello"), fingerprint(b"hello2"));
    }

    #[test]
    fn test_fingerprint_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = fingerprint_file(&dir.path().join("gone.txt")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_is_valid_checksum() {
        assert!(is_valid_checksum(&fingerprint(b"")));
        assert!(is_valid_checksum(&fingerprint(b"x").to_uppercase()));
        assert!(!is_valid_checksum("abc"));
        assert!(!is_valid_checksum(&"z".repeat(64)));
    }
}
