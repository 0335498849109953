//! Salted SHA-256 password hashes, stored as `hex(salt)$hex(digest)`.

use sha2::{Digest, Sha256};

const SALT_LEN: usize = 16;

pub fn hash_password(password: &str) -> String {
    let salt: [u8; SALT_LEN] = rand::random();
    format!("{}${}", hex::encode(salt), hex::encode(digest(&salt, password)))
}

/// Checks `password` against a stored hash. Malformed hashes never verify.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt_hex, digest_hex)) = stored.split_once('$') else {
        return false;
    };
    let (Ok(salt), Ok(expected)) = (hex::decode(salt_hex), hex::decode(digest_hex)) else {
        return false;
    };
    let actual = digest(&salt, password);
    // constant-time compare
    actual.len() == expected.len()
        && actual
            .iter()
            .zip(&expected)
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}

fn digest(salt: &[u8], password: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let stored = hash_password("correct horse");
        assert!(verify_password("correct horse", &stored));
        assert!(!verify_password("wrong horse", &stored));
    }

    #[test]
    fn test_hash_format_and_salting() {
        let a = hash_password("same");
        let b = hash_password("same");
        assert_ne!(a, b);
        let (salt, digest) = a.split_once('$').unwrap();
        assert_eq!(salt.len(), SALT_LEN * 2);
        assert_eq!(digest.len(), 64);
    }

    #[test]
    fn test_malformed_hash_rejected() {
        assert!(!verify_password("x", "no-dollar-sign"));
        assert!(!verify_password("x", "zz$zz"));
        assert!(!verify_password("x", ""));
    }
}
