//! Content hashing for short codes.
//!
//! The short code of a URL is the lowercase hex MD5 of its exact bytes, so the
//! same long URL always maps to the same code.

use md5::{Digest, Md5};

/// Length of a hex-encoded digest.
pub const DIGEST_HEX_LEN: usize = 32;

/// Returns the hex-encoded MD5 digest of `input`.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(digest("abc"), "900150983cd24fb0d6963f7d28e17f72");
/// ```
pub fn digest(input: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}
