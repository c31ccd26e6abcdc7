//! Path validation for the file cache.
//!
//! Every path the sync engine writes is assembled from values that came from
//! somewhere else (source identifiers, database ids), so they are validated
//! before touching a backend.

use std::path::{Component, Path, PathBuf};

use crate::error::{ErrorKind, Result};

/// Validates a storage path and returns its normalized form.
///
/// Paths must stay below the storage root: `..` may only cancel out a
/// previous component, absolute roots and `.` are dropped, and null bytes are
/// rejected.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use tome_storage::validate_path;
/// assert!(validate_path("novel-updates/12/cover.png").is_ok());
/// assert!(validate_path("a/../cover.png").is_ok()); // (never leaves the root)
/// assert!(validate_path("../etc/passwd").is_err());
/// assert!(validate_path("a\0b").is_err());
/// assert_eq!(
///     validate_path("/src/./12//cover.png").unwrap(),
///     Path::new("src/12/cover.png")
/// );
/// ```
pub fn validate(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    let mut components = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(s) => {
                // Null bytes pass through Path::components() on Unix but cause
                // truncation in C-based syscalls.
                if s.as_encoded_bytes().contains(&0) {
                    exn::bail!(ErrorKind::InvalidPath(path.to_path_buf()));
                }
                components.push(s)
            },
            Component::CurDir | Component::RootDir => {},
            Component::Prefix(_) => exn::bail!(ErrorKind::InvalidPath(path.to_path_buf())),
            Component::ParentDir => {
                if components.pop().is_none() {
                    exn::bail!(ErrorKind::InvalidPath(path.to_path_buf()));
                }
            },
        }
    }
    match components.is_empty() {
        true => exn::bail!(ErrorKind::InvalidPath(path.to_path_buf())),
        false => Ok(components.into_iter().collect()),
    }
}

/// Checks that `value` can be used as exactly one path component.
///
/// Source identifiers are chosen by plugin authors, so `"../x"` or `"a/b"`
/// must not be able to move a cover into another source's directory.
///
/// ```
/// use tome_storage::segment;
/// assert_eq!(segment("royalroad").unwrap(), "royalroad");
/// assert!(segment("a/b").is_err());
/// assert!(segment("..").is_err());
/// assert!(segment("").is_err());
/// ```
pub fn segment(value: &str) -> Result<&str> {
    let invalid = value.is_empty()
        || value == "."
        || value == ".."
        || value.contains(['/', '\\', '\0']);
    match invalid {
        true => exn::bail!(ErrorKind::InvalidSegment(value.to_string())),
        false => Ok(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_paths() {
        assert_eq!(validate("lnmtl/3/cover.png").unwrap(), Path::new("lnmtl/3/cover.png"));
        assert_eq!(validate("lnmtl/3/44/index.html").unwrap(), Path::new("lnmtl/3/44/index.html"));
    }

    #[test]
    fn test_path_normalization() {
        assert_eq!(validate("a//b//c").unwrap(), Path::new("a/b/c"));
        assert_eq!(validate("a/./b/./c").unwrap(), Path::new("a/b/c"));
        assert_eq!(validate("/rooted/cover.png").unwrap(), Path::new("rooted/cover.png"));
        assert_eq!(validate("a/b/..").unwrap(), Path::new("a"));
        assert_eq!(validate("covers///").unwrap(), Path::new("covers"));
    }

    #[test]
    fn test_traversal_attempts() {
        assert!(validate("../etc/passwd").is_err());
        assert!(validate("a/../../b").is_err());
        assert!(validate("..").is_err());
    }

    #[test]
    fn test_invalid_or_empty() {
        assert!(validate("a\0b").is_err());
        assert!(validate("").is_err());
        assert!(validate(".").is_err());
        assert!(validate("//").is_err());
    }

    #[test]
    fn test_segments() {
        assert_eq!(segment("42").unwrap(), "42");
        assert_eq!(segment("com.example.source").unwrap(), "com.example.source");
        for bad in ["", ".", "..", "a/b", "a\\b", "nul\0"] {
            let err = segment(bad).unwrap_err();
            assert!(matches!(&*err, ErrorKind::InvalidSegment(_)), "{bad:?} should be rejected");
        }
    }
}
