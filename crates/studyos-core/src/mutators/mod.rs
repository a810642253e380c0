//! Domain mutators
//!
//! Each submodule adds `impl Store` methods for one document. Every mutator
//! validates its input, then runs a single [`Store::transact`] so a rejected
//! call leaves the stored document byte-for-byte unchanged.
//!
//! [`Store::transact`]: crate::store::Store::transact

mod content;
mod journal;
mod profile;
mod schedule;
mod subjects;
mod topics;

use chrono::{DateTime, Utc};

use crate::error::{CoreError, CoreResult};
use crate::models::{slugify, Subject};

/// Find a subject by id in a loaded document
pub(crate) fn subject_mut<'a>(subjects: &'a mut [Subject], id: &str) -> CoreResult<&'a mut Subject> {
    subjects
        .iter_mut()
        .find(|s| s.id == id)
        .ok_or_else(|| CoreError::not_found("Subject", id))
}

/// Id derived from `name`, suffixed with the current timestamp when taken
pub(crate) fn unique_id(
    name: &str,
    fallback: &str,
    now: DateTime<Utc>,
    taken: impl Fn(&str) -> bool,
) -> String {
    let mut base = slugify(name);
    if base.is_empty() {
        base = fallback.to_string();
    }
    if !taken(&base) {
        return base;
    }

    let stamped = format!("{}-{}", base, now.timestamp_millis());
    if !taken(&stamped) {
        return stamped;
    }

    let mut n = 2;
    loop {
        let candidate = format!("{}-{}", stamped, n);
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// Require a non-blank string, returning it trimmed
pub(crate) fn required(value: &str, message: &str) -> CoreResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::validation(message));
    }
    Ok(trimmed.to_string())
}

/// Validate a 0–100 mastery value without clamping
pub(crate) fn validate_mastery(mastery: i64) -> CoreResult<u8> {
    u8::try_from(mastery)
        .ok()
        .filter(|m| *m <= 100)
        .ok_or_else(|| CoreError::validation("Mastery must be between 0 and 100"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_id() {
        let now: DateTime<Utc> = "2026-01-01T00:00:00Z".parse().unwrap();
        assert_eq!(unique_id("Physics", "subject", now, |_| false), "physics");
        assert_eq!(unique_id("!!!", "subject", now, |_| false), "subject");
        assert_eq!(
            unique_id("Physics", "subject", now, |id| id == "physics"),
            "physics-1767225600000"
        );
        assert_eq!(
            unique_id("Physics", "subject", now, |id| id.starts_with("physics")
                && !id.ends_with("-2")),
            "physics-1767225600000-2"
        );
    }

    #[test]
    fn test_validate_mastery_bounds() {
        assert_eq!(validate_mastery(0).unwrap(), 0);
        assert_eq!(validate_mastery(100).unwrap(), 100);
        for bad in [-1, 101, 255, 256, i64::MIN, i64::MAX] {
            assert!(validate_mastery(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn test_required() {
        assert_eq!(required("  Optics ", "x").unwrap(), "Optics");
        assert_eq!(required("   ", "Name is required").unwrap_err().to_string(), "Name is required");
    }
}
