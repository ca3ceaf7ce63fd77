//! Collision handling for derived filenames.

use std::path::Path;

use crate::config::ConflictPolicy;
use crate::error::SaveError;

/// Highest postfix counter probed before giving up.
pub const POSTFIX_MATCH_LIMIT: u32 = 1000;

/// Resolves `candidate` against the contents of `dir` under `policy`.
///
/// With `dry_run` the filesystem is never consulted and the candidate comes
/// back unchanged; probing stays side-effect free and cannot fail on a
/// collision.
pub fn resolve(
    candidate: &str,
    dir: &Path,
    policy: ConflictPolicy,
    dry_run: bool,
) -> Result<String, SaveError> {
    if dry_run {
        return Ok(candidate.to_string());
    }

    if !dir.join(candidate).exists() {
        return Ok(candidate.to_string());
    }

    match policy {
        ConflictPolicy::Overwrite => {
            tracing::debug!("overwriting {candidate}");
            std::fs::remove_file(dir.join(candidate))?;
            Ok(candidate.to_string())
        }
        ConflictPolicy::Skip => {
            tracing::debug!("skipping duplicate {candidate}");
            Err(SaveError::FileExists)
        }
        ConflictPolicy::Postfix => postfix(candidate, dir),
        ConflictPolicy::Request => Err(SaveError::NotImplemented),
    }
}

/// Inserts a counter before the extension until a free name is found.
/// Extension-less candidates get the counter appended with no separator.
fn postfix(candidate: &str, dir: &Path) -> Result<String, SaveError> {
    let (base, ext) = match candidate.rsplit_once('.') {
        Some((b, e)) => (b, Some(e)),
        None => (candidate, None),
    };

    for i in 1..=POSTFIX_MATCH_LIMIT {
        let name = match ext {
            Some(e) => format!("{base}.{i}.{e}"),
            None => format!("{base}{i}"),
        };
        if !dir.join(&name).exists() {
            tracing::debug!("postfixed {candidate} to {name}");
            return Ok(name);
        }
    }

    tracing::warn!("over {POSTFIX_MATCH_LIMIT} postfix matches for {candidate}, aborting");
    Err(SaveError::TooManyCollisions {
        limit: POSTFIX_MATCH_LIMIT,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), b"x").unwrap();
    }

    #[test]
    fn absent_candidate_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let r = resolve("report.txt", dir.path(), ConflictPolicy::Skip, false).unwrap();
        assert_eq!(r, "report.txt");
    }

    #[test]
    fn dry_run_never_touches_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "report.txt");
        // Even under Overwrite, a dry run must not delete anything.
        let r = resolve("report.txt", dir.path(), ConflictPolicy::Overwrite, true).unwrap();
        assert_eq!(r, "report.txt");
        assert!(dir.path().join("report.txt").exists());
    }

    #[test]
    fn overwrite_deletes_existing() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "report.txt");
        let r = resolve("report.txt", dir.path(), ConflictPolicy::Overwrite, false).unwrap();
        assert_eq!(r, "report.txt");
        assert!(!dir.path().join("report.txt").exists());
    }

    #[test]
    fn skip_aborts_with_file_exists() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "report.txt");
        let err = resolve("report.txt", dir.path(), ConflictPolicy::Skip, false).unwrap_err();
        assert!(matches!(err, SaveError::FileExists));
    }

    #[test]
    fn postfix_uses_first_free_counter() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.txt");
        let r = resolve("a.txt", dir.path(), ConflictPolicy::Postfix, false).unwrap();
        assert_eq!(r, "a.1.txt");
    }

    #[test]
    fn postfix_counter_is_monotonic() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.txt");
        touch(dir.path(), "a.1.txt");
        let r = resolve("a.txt", dir.path(), ConflictPolicy::Postfix, false).unwrap();
        assert_eq!(r, "a.2.txt");
    }

    #[test]
    fn postfix_extensionless_has_no_stray_separator() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "report");
        let r = resolve("report", dir.path(), ConflictPolicy::Postfix, false).unwrap();
        assert_eq!(r, "report1");
    }

    #[test]
    fn postfix_exhausted_aborts() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.txt");
        for i in 1..=POSTFIX_MATCH_LIMIT {
            touch(dir.path(), &format!("a.{i}.txt"));
        }
        let err = resolve("a.txt", dir.path(), ConflictPolicy::Postfix, false).unwrap_err();
        assert!(matches!(err, SaveError::TooManyCollisions { .. }));
    }

    #[test]
    fn request_policy_not_implemented() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "report.txt");
        let err = resolve("report.txt", dir.path(), ConflictPolicy::Request, false).unwrap_err();
        assert!(matches!(err, SaveError::NotImplemented));
    }
}
