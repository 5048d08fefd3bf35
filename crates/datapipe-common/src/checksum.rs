//! Stable hashes used for file bookkeeping

use sha2::{Digest, Sha256};

/// Hash identifying a data file by its path. The leading `/` is dropped so
/// that `/ftp/a.zip` and `ftp/a.zip` identify the same file.
pub fn path_hash(path: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(path.trim_start_matches('/').as_bytes());
    hasher.finalize().to_vec()
}

/// Hex form of [`path_hash`], for logs.
pub fn path_hash_hex(path: &str) -> String {
    hex::encode(path_hash(path))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_path_hash_ignores_leading_slash() {
        assert_eq!(path_hash("/ftp/a.zip"), path_hash("ftp/a.zip"));
        assert_ne!(path_hash("/ftp/a.zip"), path_hash("/ftp/b.zip"));
        assert_eq!(path_hash("/x").len(), 32);
    }

    #[test]
    fn test_path_hash_hex() {
        assert_eq!(
            path_hash_hex("hello world"),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }
}
