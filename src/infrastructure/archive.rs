//! Archive builder
//!
//! Packs a source tree into one deflated zip, skipping excluded directory
//! names at any depth and excluded file names anywhere. Entry names are
//! relative to the root with `/` separators. Entry order is not part of the
//! contract.

use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::config::DeploymentTarget;
use crate::error::{HoistError, HoistResult};

/// What ended up in the archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveStats {
    pub path: PathBuf,
    pub file_count: usize,
    /// Sum of the uncompressed file sizes
    pub content_bytes: u64,
    /// Size of the zip on disk
    pub archive_bytes: u64,
}

#[derive(Debug, Clone)]
pub struct ArchiveBuilder {
    root: PathBuf,
    exclude_dirs: HashSet<String>,
    exclude_files: HashSet<String>,
}

impl ArchiveBuilder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            exclude_dirs: HashSet::new(),
            exclude_files: HashSet::new(),
        }
    }

    /// Builder configured from a target's source dir and exclusion lists
    pub fn for_target(target: &DeploymentTarget) -> Self {
        Self::new(&target.source_dir)
            .exclude_dirs(target.exclude_dirs.iter().cloned())
            .exclude_files(target.effective_exclude_files())
    }

    pub fn exclude_dirs(mut self, names: impl IntoIterator<Item = String>) -> Self {
        self.exclude_dirs.extend(names);
        self
    }

    pub fn exclude_files(mut self, names: impl IntoIterator<Item = String>) -> Self {
        self.exclude_files.extend(names);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Relative paths of every file that would be archived.
    ///
    /// Unreadable directories and broken entries are errors, not skips.
    pub fn collect(&self) -> HoistResult<Vec<PathBuf>> {
        let excluded_dirs = self.exclude_dirs.clone();
        let walker = WalkBuilder::new(&self.root)
            .standard_filters(false)
            .follow_links(false)
            .filter_entry(move |entry| {
                let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
                !(is_dir
                    && entry.depth() > 0
                    && excluded_dirs.contains(entry.file_name().to_string_lossy().as_ref()))
            })
            .build();

        let mut files = Vec::new();
        for result in walker {
            let entry = result.map_err(|e| HoistError::Walk {
                path: self.root.clone(),
                message: e.to_string(),
            })?;
            if entry.depth() == 0 {
                continue;
            }

            let name = entry.file_name().to_string_lossy();
            if self.exclude_files.contains(name.as_ref()) {
                tracing::trace!(path = %entry.path().display(), "excluded by name");
                continue;
            }

            let Some(file_type) = entry.file_type() else {
                continue;
            };
            let is_file = if file_type.is_symlink() {
                // Archive the target's content for file links; directory links are not followed.
                std::fs::metadata(entry.path())
                    .map_err(|e| HoistError::Walk {
                        path: entry.path().to_path_buf(),
                        message: e.to_string(),
                    })?
                    .is_file()
            } else {
                file_type.is_file()
            };
            if !is_file {
                continue;
            }

            let relative = entry
                .path()
                .strip_prefix(&self.root)
                .map(Path::to_path_buf)
                .map_err(|e| HoistError::Walk {
                    path: entry.path().to_path_buf(),
                    message: e.to_string(),
                })?;
            files.push(relative);
        }

        Ok(files)
    }

    /// Write the archive to `output`, replacing any existing file.
    pub fn build(&self, output: &Path) -> HoistResult<ArchiveStats> {
        let files: Vec<PathBuf> = self
            .collect()?
            .into_iter()
            .filter(|rel| self.root.join(rel) != output)
            .collect();

        let writer = BufWriter::new(File::create(output)?);
        let mut zip = ZipWriter::new(writer);
        let mut content_bytes = 0u64;

        for relative in &files {
            let absolute = self.root.join(relative);
            let mut source = File::open(&absolute).map_err(|e| HoistError::Walk {
                path: absolute.clone(),
                message: e.to_string(),
            })?;
            let metadata = source.metadata()?;

            zip.start_file(entry_name(relative), file_options(&metadata))?;
            content_bytes += io::copy(&mut source, &mut zip)?;
        }

        let mut writer = zip.finish()?;
        writer.flush()?;
        drop(writer);

        let archive_bytes = std::fs::metadata(output)?.len();
        tracing::debug!(
            path = %output.display(),
            files = files.len(),
            content_bytes,
            archive_bytes,
            "archive written"
        );

        Ok(ArchiveStats {
            path: output.to_path_buf(),
            file_count: files.len(),
            content_bytes,
            archive_bytes,
        })
    }
}

/// Zip entry name: relative path joined with `/` regardless of platform
fn entry_name(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn file_options(metadata: &std::fs::Metadata) -> SimpleFileOptions {
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .large_file(metadata.len() >= u64::from(u32::MAX));

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        options.unix_permissions(metadata.permissions().mode())
    }
    #[cfg(not(unix))]
    {
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::fs;
    use std::io::Read;
    use tempfile::tempdir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn read_archive(path: &Path) -> BTreeMap<String, String> {
        let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
        let mut out = BTreeMap::new();
        for i in 0..archive.len() {
            let mut entry = archive.by_index(i).unwrap();
            let mut content = String::new();
            entry.read_to_string(&mut content).unwrap();
            out.insert(entry.name().to_string(), content);
        }
        out
    }

    fn sample_tree(root: &Path) {
        write(root, "package.json", "{}");
        write(root, "src/app/page.tsx", "export default 1");
        write(root, "src/lib/db.ts", "db");
        write(root, "node_modules/react/index.js", "react");
        write(root, "src/node_modules/nested/index.js", "nested");
        write(root, ".git/HEAD", "ref");
        write(root, "deploy.py", "old");
        write(root, "src/deploy.py", "also excluded");
        write(root, ".env.local", "SECRET=1");
    }

    #[test]
    fn archive_contains_exactly_the_non_excluded_files() {
        let src = tempdir().unwrap();
        sample_tree(src.path());
        let out = tempdir().unwrap();
        let zip_path = out.path().join("app.zip");

        let stats = ArchiveBuilder::new(src.path())
            .exclude_dirs(["node_modules".to_string(), ".git".to_string()])
            .exclude_files(["deploy.py".to_string()])
            .build(&zip_path)
            .unwrap();

        let entries = read_archive(&zip_path);
        let names: Vec<&str> = entries.keys().map(String::as_str).collect();
        assert_eq!(
            names,
            vec![".env.local", "package.json", "src/app/page.tsx", "src/lib/db.ts"]
        );
        assert_eq!(entries["src/app/page.tsx"], "export default 1");
        assert_eq!(stats.file_count, 4);
        assert!(stats.archive_bytes > 0);
    }

    #[test]
    fn archive_written_inside_root_is_not_archived() {
        let src = tempdir().unwrap();
        write(src.path(), "index.js", "1");
        let zip_path = src.path().join("app.zip");
        fs::write(&zip_path, "stale archive").unwrap();

        ArchiveBuilder::new(src.path()).build(&zip_path).unwrap();

        let entries = read_archive(&zip_path);
        assert_eq!(entries.keys().collect::<Vec<_>>(), vec!["index.js"]);
    }

    #[test]
    fn excluded_dir_name_only_matches_directories() {
        let src = tempdir().unwrap();
        write(src.path(), "build", "a file called build");
        write(src.path(), "out/build/x.js", "x");

        let files = ArchiveBuilder::new(src.path())
            .exclude_dirs(["build".to_string()])
            .collect()
            .unwrap();

        assert_eq!(files, vec![PathBuf::from("build")]);
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = tempdir().unwrap();
        let err = ArchiveBuilder::new(dir.path().join("missing"))
            .collect()
            .unwrap_err();
        assert!(matches!(err, HoistError::Walk { .. }));
    }

    #[test]
    fn unwritable_output_is_an_error() {
        let src = tempdir().unwrap();
        write(src.path(), "index.js", "1");
        let err = ArchiveBuilder::new(src.path())
            .build(&src.path().join("no/such/dir/app.zip"))
            .unwrap_err();
        assert!(matches!(err, HoistError::Io(_)));
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_directory_is_surfaced() {
        use std::os::unix::fs::PermissionsExt;

        let src = tempdir().unwrap();
        write(src.path(), "locked/secret.txt", "x");
        let locked = src.path().join("locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Privileged users can read it anyway; nothing to assert then.
        let readable = fs::read_dir(&locked).is_ok();
        let result = ArchiveBuilder::new(src.path()).collect();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        if !readable {
            assert!(matches!(result, Err(HoistError::Walk { .. })));
        }
    }

    #[test]
    fn entry_names_use_forward_slashes() {
        assert_eq!(entry_name(Path::new("src").join("a").join("b.ts").as_path()), "src/a/b.ts");
    }
}
