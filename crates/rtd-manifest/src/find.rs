//! Manifest discovery.

use crate::validation::absolute_path;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Recognized manifest file names, in lookup order within one directory
pub const CONFIG_FILENAMES: &[&str] = &["readthedocs.yml", ".readthedocs.yml"];

/// Walk `root` top-down and yield every file named in `filenames`.
///
/// Subdirectories are visited in sorted order. Inside one directory the
/// matches follow the order of `filenames`, not the alphabet.
pub fn find_all<'a>(root: &Path, filenames: &'a [&'a str]) -> impl Iterator<Item = PathBuf> + 'a {
    let root = absolute_path(root);
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::debug!("Skipping unreadable entry: {}", err);
                None
            }
        })
        .filter(|entry| entry.file_type().is_dir())
        .flat_map(move |entry| {
            let dir = entry.into_path();
            filenames
                .iter()
                .map(move |name| dir.join(name))
                .filter(|candidate| candidate.is_file())
                .collect::<Vec<_>>()
        })
}

/// First manifest under `root`, if any
pub fn find_one(root: &Path, filenames: &[&str]) -> Option<PathBuf> {
    find_all(root, filenames).next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        let _ = fs::write(path, "");
    }

    #[test]
    fn test_find_no_files() {
        let Ok(dir) = TempDir::new() else {
            return;
        };
        assert_eq!(find_all(dir.path(), CONFIG_FILENAMES).count(), 0);
        assert!(find_one(dir.path(), CONFIG_FILENAMES).is_none());
    }

    #[test]
    fn test_find_at_root() {
        let Ok(dir) = TempDir::new() else {
            return;
        };
        touch(&dir.path().join("readthedocs.yml"));
        touch(&dir.path().join("otherfile.txt"));

        let paths: Vec<PathBuf> = find_all(dir.path(), &["readthedocs.yml"]).collect();
        assert_eq!(paths, vec![dir.path().join("readthedocs.yml")]);
    }

    #[test]
    fn test_find_nested_in_sorted_order() {
        let Ok(dir) = TempDir::new() else {
            return;
        };
        touch(&dir.path().join("third").join("readthedocs.yml"));
        touch(&dir.path().join("second").join("confuser.txt"));
        touch(&dir.path().join("first").join("readthedocs.yml"));

        let paths: Vec<PathBuf> = find_all(dir.path(), &["readthedocs.yml"]).collect();
        assert_eq!(
            paths,
            vec![
                dir.path().join("first").join("readthedocs.yml"),
                dir.path().join("third").join("readthedocs.yml"),
            ]
        );
    }

    #[test]
    fn test_find_multiple_names_follow_caller_order() {
        let Ok(dir) = TempDir::new() else {
            return;
        };
        let first = dir.path().join("first");
        touch(&first.join("readthedocs.yml"));
        touch(&first.join(".readthedocs.yml"));
        touch(&dir.path().join("third").join("readthedocs.yml"));

        let paths: Vec<PathBuf> =
            find_all(dir.path(), &["readthedocs.yml", ".readthedocs.yml"]).collect();
        assert_eq!(
            paths,
            vec![
                first.join("readthedocs.yml"),
                first.join(".readthedocs.yml"),
                dir.path().join("third").join("readthedocs.yml"),
            ]
        );

        let paths: Vec<PathBuf> =
            find_all(dir.path(), &[".readthedocs.yml", "readthedocs.yml"]).collect();
        assert_eq!(paths[0], first.join(".readthedocs.yml"));
        assert_eq!(paths[1], first.join("readthedocs.yml"));
    }

    #[test]
    fn test_find_is_repeatable() {
        let Ok(dir) = TempDir::new() else {
            return;
        };
        for name in ["b", "a", "c/d", "c/a"] {
            touch(&dir.path().join(name).join("readthedocs.yml"));
        }
        let first: Vec<PathBuf> = find_all(dir.path(), CONFIG_FILENAMES).collect();
        let second: Vec<PathBuf> = find_all(dir.path(), CONFIG_FILENAMES).collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
        assert!(first[0].ends_with("a/readthedocs.yml"));
        assert!(first[2].ends_with("c/a/readthedocs.yml"));
    }

    #[test]
    fn test_find_one_returns_first_match() {
        let Ok(dir) = TempDir::new() else {
            return;
        };
        touch(&dir.path().join("z").join("readthedocs.yml"));
        touch(&dir.path().join("readthedocs.yml"));
        assert_eq!(
            find_one(dir.path(), CONFIG_FILENAMES),
            Some(dir.path().join("readthedocs.yml"))
        );
    }
}
