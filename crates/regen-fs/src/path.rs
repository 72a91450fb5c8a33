//! Lexical path normalization
//!
//! Registry keys must not depend on how a path was spelled on the command
//! line, so `a/./b.ts`, `a/x/../b.ts` and `a/b.ts` all normalize to the same
//! value. Nothing here touches the filesystem; symlinks are not resolved.

use std::path::{Component, Path, PathBuf};

/// Removes `.` components and folds `..` into the preceding component.
///
/// A `..` that cannot be folded is kept on relative paths and dropped at the
/// root of absolute ones.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Forward-slash form of `path`.
pub fn to_slash(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Normalized `path` relative to `root`, with `/` separators.
///
/// Relative paths are taken relative to `root`. Paths outside `root` keep
/// their normalized full form.
pub fn relative_to(root: &Path, path: &Path) -> String {
    let root = normalize(root);
    let full = normalize(&root.join(path));
    match full.strip_prefix(&root) {
        Ok(relative) => to_slash(relative),
        Err(_) => to_slash(&full),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("a/./b.ts", "a/b.ts")]
    #[case("a/x/../b.ts", "a/b.ts")]
    #[case("./b.ts", "b.ts")]
    #[case("../b.ts", "../b.ts")]
    #[case("/../b.ts", "/b.ts")]
    #[case("a/b/../../..", "..")]
    fn normalize_is_lexical(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize(Path::new(input)), PathBuf::from(expected));
    }

    #[test]
    fn relative_to_strips_root() {
        let root = Path::new("/work/project");
        assert_eq!(relative_to(root, Path::new("/work/project/./src/a.ts")), "src/a.ts");
        assert_eq!(relative_to(root, Path::new("src/x/../a.ts")), "src/a.ts");
        assert_eq!(relative_to(Path::new("/work/./project/"), Path::new("/work/project/a.ts")), "a.ts");
    }

    #[test]
    fn relative_to_keeps_outside_paths() {
        assert_eq!(
            relative_to(Path::new("/work/project"), Path::new("/elsewhere/a.ts")),
            "/elsewhere/a.ts"
        );
    }
}
