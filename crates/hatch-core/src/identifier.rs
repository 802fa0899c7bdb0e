//! Module identifier rewriting.
//!
//! Changes the module path declared in `go.mod`, every import of that module
//! in Go sources, and (best effort) any literal occurrence in auxiliary files
//! selected by extra patterns.

use std::path::Path;

use crate::content;
use crate::error::{HatchError, Result};
use crate::golang;
use crate::manifest::{self, MANIFEST_FILE};
use crate::patterns::{PatternSet, NATIVE_EXTENSION};
use crate::walk::{self, Prune};

/// Replace the template's module path with `new_identifier` below `root`.
///
/// Returns the modified files relative to `root`: `go.mod` first, then Go
/// sources, then auxiliary files. Nothing is written when the identifier is
/// already `new_identifier`.
pub fn rewrite_identifier(
    root: &Path,
    new_identifier: &str,
    extra_patterns: &[String],
) -> Result<Vec<String>> {
    let (manifest_path, parsed) = manifest::load(root)?;
    let old_identifier = parsed.module_path().to_string();
    if old_identifier == new_identifier {
        tracing::debug!("module path is already {new_identifier}");
        return Ok(Vec::new());
    }
    tracing::info!("rewriting module {old_identifier} to {new_identifier}");

    let updated = parsed.with_module_path(new_identifier);
    std::fs::write(&manifest_path, updated)
        .map_err(|e| HatchError::file_io("writing", &manifest_path, e))?;
    let mut modified = vec![MANIFEST_FILE.to_string()];

    for rel in rewrite_go_files(root, &old_identifier, new_identifier)? {
        modified.push(rel);
    }

    if !extra_patterns.is_empty() {
        for rel in rewrite_extra_files(root, &old_identifier, new_identifier, extra_patterns)? {
            if !modified.contains(&rel) {
                modified.push(rel);
            }
        }
    }

    Ok(modified)
}

fn is_go_file(name: &str) -> bool {
    Path::new(name)
        .extension()
        .is_some_and(|ext| ext == NATIVE_EXTENSION)
}

fn rewrite_go_files(root: &Path, old: &str, new: &str) -> Result<Vec<String>> {
    let mut modified = Vec::new();
    for path in walk::files(root, Prune::MetadataAndVendor, is_go_file)? {
        let changed = content::update_file(&path, |data| {
            let Ok(src) = std::str::from_utf8(data) else {
                return Err(HatchError::GoSyntax {
                    path: path.clone(),
                    message: "source is not valid UTF-8".into(),
                });
            };
            golang::rewrite_imports(src, old, new)
                .map(|out| out.map(String::into_bytes))
                .map_err(|message| HatchError::GoSyntax {
                    path: path.clone(),
                    message,
                })
        })?;
        if changed {
            let rel = walk::relative(root, &path)?;
            tracing::debug!("rewrote imports in {rel}");
            modified.push(rel);
        }
    }
    Ok(modified)
}

fn rewrite_extra_files(
    root: &Path,
    old: &str,
    new: &str,
    extra_patterns: &[String],
) -> Result<Vec<String>> {
    let patterns = PatternSet::normalize(extra_patterns);
    let mut modified = Vec::new();
    for path in walk::files(root, Prune::MetadataAndVendor, |name| patterns.matches(name))? {
        let changed = content::update_file(&path, |data| {
            Ok(content::replace_all(data, old.as_bytes(), new.as_bytes()))
        })?;
        if changed {
            let rel = walk::relative(root, &path)?;
            tracing::debug!("replaced module path in {rel}");
            modified.push(rel);
        }
    }
    Ok(modified)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn template(root: &Path) {
        fs::create_dir_all(root.join("cmd/app")).unwrap();
        fs::create_dir_all(root.join("internal/util")).unwrap();
        fs::write(root.join("go.mod"), "module old/mod\n\ngo 1.22\n").unwrap();
        fs::write(
            root.join("cmd/app/main.go"),
            "package main\n\nimport (\n\t\"fmt\"\n\n\t\"old/mod/internal/util\"\n)\n\nfunc main() { fmt.Println(util.Name) }\n",
        )
        .unwrap();
        fs::write(
            root.join("internal/util/util.go"),
            "package util\n\nconst Name = \"util\"\n",
        )
        .unwrap();
    }

    #[test]
    fn test_rewrite_identifier() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        template(root);

        let modified = rewrite_identifier(root, "new/mod", &[]).unwrap();

        assert_eq!(modified, vec!["go.mod".to_string(), "cmd/app/main.go".to_string()]);
        assert_eq!(
            fs::read_to_string(root.join("go.mod")).unwrap(),
            "module new/mod\n\ngo 1.22\n"
        );
        assert!(fs::read_to_string(root.join("cmd/app/main.go"))
            .unwrap()
            .contains("\"new/mod/internal/util\""));
        assert_eq!(manifest::read_module_path(root).unwrap(), "new/mod");
    }

    #[test]
    fn test_rewrite_identifier_same_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        template(dir.path());
        assert!(rewrite_identifier(dir.path(), "old/mod", &[]).unwrap().is_empty());
    }

    #[test]
    fn test_rewrite_identifier_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        template(dir.path());
        rewrite_identifier(dir.path(), "new/mod", &[]).unwrap();
        assert!(rewrite_identifier(dir.path(), "new/mod", &[]).unwrap().is_empty());
    }

    #[test]
    fn test_rewrite_identifier_never_touches_vendor() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        template(root);
        fs::create_dir_all(root.join("vendor/old/mod/dep")).unwrap();
        let vendored = "package dep\n\nimport \"old/mod/internal/util\"\n";
        fs::write(root.join("vendor/old/mod/dep/dep.go"), vendored).unwrap();
        fs::write(root.join("vendor/modules.txt"), "# old/mod\n").unwrap();

        let modified =
            rewrite_identifier(root, "new/mod", &["txt".to_string(), "go".to_string()]).unwrap();

        assert!(modified.iter().all(|f| !f.starts_with("vendor")));
        assert_eq!(
            fs::read_to_string(root.join("vendor/old/mod/dep/dep.go")).unwrap(),
            vendored
        );
        assert_eq!(
            fs::read_to_string(root.join("vendor/modules.txt")).unwrap(),
            "# old/mod\n"
        );
    }

    #[test]
    fn test_rewrite_identifier_extra_patterns() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        template(root);
        fs::write(root.join("README.md"), "go get old/mod\n").unwrap();
        fs::write(root.join("Makefile"), "PKG := old/mod/cmd/app\n").unwrap();
        fs::write(root.join("notes.txt"), "old/mod\n").unwrap();

        let modified = rewrite_identifier(
            root,
            "github.com/me/app",
            &[".md".to_string(), "Makefile".to_string()],
        )
        .unwrap();

        assert_eq!(
            modified,
            vec![
                "go.mod".to_string(),
                "cmd/app/main.go".to_string(),
                "Makefile".to_string(),
                "README.md".to_string(),
            ]
        );
        assert_eq!(
            fs::read_to_string(root.join("README.md")).unwrap(),
            "go get github.com/me/app\n"
        );
        assert_eq!(
            fs::read_to_string(root.join("Makefile")).unwrap(),
            "PKG := github.com/me/app/cmd/app\n"
        );
        assert_eq!(fs::read_to_string(root.join("notes.txt")).unwrap(), "old/mod\n");
    }

    #[test]
    fn test_rewrite_identifier_syntax_error_names_file() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        template(root);
        fs::write(root.join("broken.go"), "package broken\nimport \"old/mod\n").unwrap();

        let err = rewrite_identifier(root, "new/mod", &[]).unwrap_err();
        assert!(matches!(err, HatchError::GoSyntax { .. }));
        assert!(err.to_string().contains("broken.go"), "{err}");
    }

    #[test]
    fn test_rewrite_identifier_rejects_error_after_imports() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("go.mod"), "module old/mod\n").unwrap();
        let broken = "package main\n\nimport \"old/mod/pkg\"\n\nfunc main() {\n\tpkg.Run(\n";
        fs::write(root.join("main.go"), broken).unwrap();

        let err = rewrite_identifier(root, "new/mod", &[]).unwrap_err();
        assert!(matches!(err, HatchError::GoSyntax { .. }));
        assert!(err.to_string().contains("main.go"), "{err}");
        assert_eq!(fs::read_to_string(root.join("main.go")).unwrap(), broken);
    }

    #[test]
    fn test_rewrite_identifier_missing_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let err = rewrite_identifier(dir.path(), "new/mod", &[]).unwrap_err();
        assert!(err.to_string().contains("go.mod"), "{err}");
    }

    #[cfg(unix)]
    #[test]
    fn test_rewrite_identifier_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        template(root);
        let main = root.join("cmd/app/main.go");
        fs::set_permissions(&main, fs::Permissions::from_mode(0o755)).unwrap();

        rewrite_identifier(root, "new/mod", &[]).unwrap();

        let mode = fs::metadata(&main).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }
}
