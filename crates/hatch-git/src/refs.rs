//! Parsing of `git ls-remote` output.

use hatch_core::backend::RemoteRef;

/// Parse `<object-id>\t<refname>` lines.
///
/// Lines that do not look like a reference advertisement (warnings, blank
/// lines, `HEAD` symref hints) are skipped.
pub fn parse_ls_remote(output: &str) -> Vec<RemoteRef> {
    output
        .lines()
        .filter_map(|line| {
            let (oid, name) = line.trim_end().split_once('\t')?;
            if !is_object_id(oid) || !name.starts_with("refs/") {
                return None;
            }
            Some(RemoteRef::new(name, oid))
        })
        .collect()
}

/// SHA-1 (40) or SHA-256 (64) hex digest.
fn is_object_id(s: &str) -> bool {
    matches!(s.len(), 40 | 64) && s.bytes().all(|b| b.is_ascii_hexdigit())
}
