use crate::digest::{compute_hash, Digest};

/// Parent of two adjacent nodes: the hash of `left` followed by `right`.
pub fn combine(left: &str, right: &str) -> Digest {
    let mut payload = String::with_capacity(left.len() + right.len());
    payload.push_str(left);
    payload.push_str(right);
    compute_hash(payload.as_bytes())
}

/// Fold an ordered hash list into a single root digest.
///
/// Adjacent pairs are combined left to right. A lone trailing node on an
/// odd-length level is promoted to the next level as is; it is never
/// duplicated or re-hashed. An empty list has no root and yields `""`.
pub fn build_digest(hashes: &[Digest]) -> Digest {
    levels(hashes)
        .pop()
        .and_then(|mut root| root.pop())
        .unwrap_or_default()
}

/// Every reduction level, leaves first and the single-node root level last.
/// Empty input yields no levels.
pub fn levels(hashes: &[Digest]) -> Vec<Vec<Digest>> {
    if hashes.is_empty() {
        return Vec::new();
    }
    let mut levels = vec![hashes.to_vec()];
    while let Some(current) = levels.last().filter(|level| level.len() > 1) {
        let next = current
            .chunks(2)
            .map(|pair| match pair {
                [left, right] => combine(left, right),
                _ => pair[0].clone(),
            })
            .collect();
        levels.push(next);
    }
    levels
}
