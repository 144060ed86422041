use sha2::{Digest as _, Sha256};

/// SHA-256 hash as lowercase hex string. The empty string means "no digest".
pub type Digest = String;

/// Length of a hex-encoded SHA-256 digest.
pub const DIGEST_HEX_LEN: usize = 64;

/// Compute the SHA-256 hex digest of some data.
pub fn compute_hash(data: &[u8]) -> Digest {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// Whether `s` has the shape of a digest produced by [`compute_hash`].
pub fn is_well_formed(s: &str) -> bool {
    s.len() == DIGEST_HEX_LEN
        && s
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}
