//! One-time code generation and salted hashing. Plain codes never leave this module
//! except inside the outbound email.

use rand::{Rng, RngCore};
use sha2::{Digest, Sha256};

const SALT_LEN: usize = 16;

/// Uniformly random 6-digit numeric code (leading zeros allowed).
pub fn generate_code() -> String {
    let n: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{n:06}")
}

/// `<salt_hex>$<sha256(salt || code)_hex>`
pub fn hash_code(code: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    hash_with_salt(code, &salt)
}

/// Constant-time comparison of `code` against a stored hash.
pub fn code_matches(code: &str, stored_hash: &str) -> bool {
    let Some((salt_hex, _)) = stored_hash.split_once('$') else {
        return false;
    };
    let Ok(salt) = hex::decode(salt_hex) else {
        return false;
    };
    let candidate = hash_with_salt(code, &salt);
    constant_time_eq(candidate.as_bytes(), stored_hash.as_bytes())
}

fn hash_with_salt(code: &str, salt: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(code.as_bytes());
    format!("{}${}", hex::encode(salt), hex::encode(hasher.finalize()))
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
