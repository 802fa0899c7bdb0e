//! In-place file edits for the rewrite stages.

use std::path::Path;

use crate::error::{HatchError, Result};

/// Replace every occurrence of `needle` in `haystack`.
///
/// Returns `None` when `needle` is empty or does not occur.
pub fn replace_all(haystack: &[u8], needle: &[u8], with: &[u8]) -> Option<Vec<u8>> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }

    let mut out = Vec::with_capacity(haystack.len());
    let mut rest = haystack;
    let mut found = false;
    while let Some(pos) = find(rest, needle) {
        found = true;
        out.extend_from_slice(&rest[..pos]);
        out.extend_from_slice(with);
        rest = &rest[pos + needle.len()..];
    }
    if !found {
        return None;
    }
    out.extend_from_slice(rest);
    Some(out)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Read `path`, let `edit` produce new contents, and write them back only
/// if they differ. Returns whether the file was written.
///
/// Writing over the existing file keeps its permission bits.
pub fn update_file<F>(path: &Path, edit: F) -> Result<bool>
where
    F: FnOnce(&[u8]) -> Result<Option<Vec<u8>>>,
{
    let original = std::fs::read(path).map_err(|e| HatchError::file_io("reading", path, e))?;
    match edit(&original)? {
        Some(updated) if updated != original => {
            std::fs::write(path, updated).map_err(|e| HatchError::file_io("writing", path, e))?;
            Ok(true)
        }
        _ => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_all() {
        assert_eq!(
            replace_all(b"a __X__ b __X__", b"__X__", b"y").as_deref(),
            Some(&b"a y b y"[..])
        );
        assert_eq!(replace_all(b"nothing", b"__X__", b"y"), None);
        assert_eq!(replace_all(b"abc", b"", b"y"), None);
        assert_eq!(replace_all(b"ab", b"abc", b"y"), None);
    }

    #[test]
    fn test_replace_all_non_utf8() {
        let input = [0xff, b'o', b'l', b'd', 0xfe];
        assert_eq!(
            replace_all(&input, b"old", b"new").unwrap(),
            vec![0xff, b'n', b'e', b'w', 0xfe]
        );
    }

    #[test]
    fn test_update_file_skips_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "same").unwrap();

        assert!(!update_file(&path, |b| Ok(Some(b.to_vec()))).unwrap());
        assert!(!update_file(&path, |_| Ok(None)).unwrap());
        assert!(update_file(&path, |_| Ok(Some(b"new".to_vec()))).unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn test_update_file_missing_names_path() {
        let err = update_file(Path::new("/nonexistent/hatch.txt"), |_| Ok(None)).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/hatch.txt"));
    }
}
