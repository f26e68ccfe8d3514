//! Property tests for archive contents.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, File};
use std::io::Read;
use std::path::PathBuf;

use proptest::prelude::*;

use hoist::ArchiveBuilder;

fn segment() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-z]{1,6}").unwrap()
}

/// Relative file paths one to three segments deep; names never collide with a directory.
fn tree() -> impl Strategy<Value = BTreeSet<String>> {
    proptest::collection::btree_set(
        proptest::collection::vec(segment(), 1..=3).prop_map(|segs| {
            let (file, dirs) = segs.split_last().unwrap();
            let mut parts: Vec<String> = dirs.iter().map(|d| format!("{d}_d")).collect();
            parts.push(format!("{file}.txt"));
            parts.join("/")
        }),
        1..=12,
    )
}

fn archived_names(path: &std::path::Path) -> BTreeSet<String> {
    let mut zip = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
    (0..zip.len())
        .map(|i| zip.by_index(i).unwrap().name().to_string())
        .collect()
}

fn archived_contents(path: &std::path::Path) -> BTreeMap<String, String> {
    let mut zip = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
    (0..zip.len())
        .map(|i| {
            let mut entry = zip.by_index(i).unwrap();
            let mut content = String::new();
            entry.read_to_string(&mut content).unwrap();
            (entry.name().to_string(), content)
        })
        .collect()
}

fn write_tree(root: &std::path::Path, files: &BTreeSet<String>) {
    for rel in files {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, format!("contents of {rel}")).unwrap();
    }
}

fn file_name(rel: &str) -> &str {
    rel.rsplit('/').next().unwrap_or(rel)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 48,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: The archive holds exactly the files outside excluded directories
    /// whose names are not excluded, each with its original content.
    #[test]
    fn property_archive_is_tree_minus_exclusions(
        files in tree(),
        excluded in proptest::collection::btree_set(segment(), 0..=2),
        excluded_names in proptest::collection::btree_set(segment(), 0..=3),
    ) {
        let src = tempfile::tempdir().unwrap();
        write_tree(src.path(), &files);
        let excluded_dirs: BTreeSet<String> = excluded.iter().map(|d| format!("{d}_d")).collect();
        let excluded_files: BTreeSet<String> =
            excluded_names.iter().map(|f| format!("{f}.txt")).collect();

        let out = tempfile::tempdir().unwrap();
        let archive = out.path().join("app.zip");
        let stats = ArchiveBuilder::new(src.path())
            .exclude_dirs(excluded_dirs.iter().cloned())
            .exclude_files(excluded_files.iter().cloned())
            .build(&archive)
            .unwrap();

        let expected: BTreeMap<String, String> = files
            .iter()
            .filter(|rel| {
                let p = PathBuf::from(rel);
                !p.parent()
                    .into_iter()
                    .flat_map(|parent| parent.iter())
                    .any(|seg| excluded_dirs.contains(seg.to_string_lossy().as_ref()))
            })
            .filter(|rel| !excluded_files.contains(file_name(rel)))
            .map(|rel| (rel.clone(), format!("contents of {rel}")))
            .collect();

        let archived = archived_contents(&archive);
        prop_assert_eq!(stats.file_count, expected.len());
        prop_assert!(archived.keys().all(|name| !excluded_files.contains(file_name(name))));
        prop_assert_eq!(archived, expected);
    }

    /// PROPERTY: Building twice from an unchanged tree yields the same entries.
    #[test]
    fn property_rebuild_is_stable(
        files in tree(),
        excluded_names in proptest::collection::btree_set(segment(), 0..=2),
    ) {
        let src = tempfile::tempdir().unwrap();
        write_tree(src.path(), &files);
        let builder = ArchiveBuilder::new(src.path())
            .exclude_files(excluded_names.iter().map(|f| format!("{f}.txt")));
        let archive = src.path().join("bundle.zip");

        builder.build(&archive).unwrap();
        let first = archived_contents(&archive);
        builder.build(&archive).unwrap();
        let second = archived_contents(&archive);

        prop_assert_eq!(first, second);
    }

    /// PROPERTY: An archive written inside its own source tree never contains itself.
    #[test]
    fn property_archive_never_contains_itself(files in tree()) {
        let src = tempfile::tempdir().unwrap();
        for rel in &files {
            let path = src.path().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, b"x").unwrap();
        }
        let archive = src.path().join("bundle.zip");
        fs::write(&archive, b"stale archive from an earlier run").unwrap();

        ArchiveBuilder::new(src.path()).build(&archive).unwrap();

        let names = archived_names(&archive);
        prop_assert!(!names.contains("bundle.zip"));
        prop_assert_eq!(names, files);
    }
}
