use std::collections::HashSet;
use std::path::Path;
use walkdir::WalkDir;

use crate::config::LibraryConfig;

/// List the immediate entries of every category folder as relative keys
/// (`<category>/<name>`). Files and folders both count; hidden entries don't.
///
/// A category folder that doesn't exist contributes nothing.
pub fn list_media_entries(root: &Path, categories: &[String]) -> Vec<String> {
    let mut entries = Vec::new();

    for category in categories {
        for entry in WalkDir::new(root.join(category))
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let name = entry.file_name().to_string_lossy();
            if name.starts_with('.') {
                continue;
            }
            entries.push(format!("{}/{}", category, name));
        }
    }

    // Sort by key for consistent ordering
    entries.sort();
    entries.dedup();

    entries
}

/// Entries on disk that are neither recorded yet nor on the ignore list.
pub fn find_candidates(library: &LibraryConfig, known: &HashSet<String>) -> Vec<String> {
    list_media_entries(&library.root, &library.categories)
        .into_iter()
        .filter(|key| !known.contains(key))
        .filter(|key| !library.ignore.iter().any(|ignored| ignored == key))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use tempfile::tempdir;

    fn library_at(root: &Path) -> LibraryConfig {
        LibraryConfig {
            root: root.to_path_buf(),
            ..Default::default()
        }
    }

    #[test]
    fn test_list_media_entries() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("movies/Alien (1979)")).unwrap();
        fs::create_dir_all(dir.path().join("TV/Firefly (2002)")).unwrap();
        File::create(dir.path().join("movies/Heat (1995).mkv")).unwrap();
        File::create(dir.path().join("movies/.DS_Store")).unwrap();

        // Nested entries are not listed
        File::create(dir.path().join("movies/Alien (1979)/alien.mkv")).unwrap();

        let entries = list_media_entries(dir.path(), &["TV".to_string(), "movies".to_string()]);

        assert_eq!(
            entries,
            vec![
                "TV/Firefly (2002)".to_string(),
                "movies/Alien (1979)".to_string(),
                "movies/Heat (1995).mkv".to_string(),
            ]
        );
    }

    #[test]
    fn test_missing_category_is_empty() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("movies/Alien (1979)")).unwrap();

        let entries = list_media_entries(dir.path(), &["TV".to_string(), "movies".to_string()]);
        assert_eq!(entries, vec!["movies/Alien (1979)".to_string()]);
    }

    #[test]
    fn test_find_candidates_subtracts_known_and_ignored() {
        let dir = tempdir().unwrap();
        for name in [
            "movies/Alien (1979)",
            "movies/Heat (1995)",
            "movies/subtitles",
            "movies/old",
            "TV/Firefly (2002)",
        ] {
            fs::create_dir_all(dir.path().join(name)).unwrap();
        }

        let known: HashSet<String> = ["movies/Heat (1995)".to_string()].into_iter().collect();
        let candidates = find_candidates(&library_at(dir.path()), &known);

        assert_eq!(
            candidates,
            vec![
                "TV/Firefly (2002)".to_string(),
                "movies/Alien (1979)".to_string(),
            ]
        );
    }
}
