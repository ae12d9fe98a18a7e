//! Content identifier normalization.
use ::cid::Cid;

/// Returns the canonical form of a content identifier: CIDv1 rendered in
/// base32 lower multibase.
///
/// Anything that does not parse as a CID is returned unchanged so the
/// request is still attempted against the gateway.
#[must_use]
pub fn normalize_cid(raw: &str) -> String {
    match Cid::try_from(raw.trim()).and_then(Cid::into_v1) {
        Ok(cid) => cid.to_string(),
        Err(_) => raw.to_owned(),
    }
}
