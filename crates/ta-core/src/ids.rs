//! ULID-based identifiers.
//!
//! Entity ids are minted with [`generate`]. A separate process-level id,
//! [`scoring_run`], is stamped onto every score row finalized by this
//! process so a batch of rows can be traced back to the run that wrote them.

use once_cell::sync::Lazy;
use ulid::Ulid;

static SCORING_RUN_ID: Lazy<String> = Lazy::new(|| Ulid::new().to_string());

/// Mints a fresh ULID for a new entity (assessment, response, score row).
///
/// ULIDs are 26 characters, URL-safe, and sort lexicographically by
/// creation time, which keeps insertion order observable in id order.
#[inline]
pub fn generate() -> String {
    Ulid::new().to_string()
}

/// Returns the process-level scoring-run id (same value for the whole
/// process lifetime).
#[inline]
pub fn scoring_run() -> &'static str {
    &SCORING_RUN_ID
}
