//! A directory- and jar-backed classpath, wired into
//! `headc_binder::ClassPathLookup`.
//!
//! The binder itself only ever asks "(binary name) -> bytes, at most once
//! per symbol"; this crate is the concrete side of that contract, backed by
//! real files. Project-classpath entries are consulted before
//! boot-classpath entries, each list in the given order, first match wins.

use std::fs::File;
use std::path::{Path, PathBuf};

use headc_archive::ArchiveReader;
use headc_binder::ClassPathLookup;
use rustc_hash::FxHashMap;

#[derive(Debug, thiserror::Error)]
pub enum ClassPathError {
    #[error("classpath entry does not exist: {0}")]
    NotFound(PathBuf),
    #[error("failed to open classpath archive {path}: {source}")]
    OpenArchive {
        path: PathBuf,
        #[source]
        source: headc_archive::ArchiveError,
    },
}

pub type Result<T> = std::result::Result<T, ClassPathError>;

/// A directory entry's file listing, built on first lookup and cached from
/// then on: `internal/name` (no `.class` suffix, `/`-separated) -> path.
struct DirEntry {
    root: PathBuf,
    index: Option<FxHashMap<String, PathBuf>>,
}

impl DirEntry {
    fn ensure_index(&mut self) -> &FxHashMap<String, PathBuf> {
        if self.index.is_none() {
            let mut map = FxHashMap::default();
            for entry in walkdir::WalkDir::new(&self.root).into_iter().filter_map(|e| e.ok()) {
                if !entry.file_type().is_file() {
                    continue;
                }
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) != Some("class") {
                    continue;
                }
                let Ok(rel) = path.strip_prefix(&self.root) else { continue };
                let internal_name = rel
                    .with_extension("")
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect::<Vec<_>>()
                    .join("/");
                map.insert(internal_name, path.to_path_buf());
            }
            self.index = Some(map);
        }
        self.index.as_ref().expect("index just populated")
    }

    fn lookup(&mut self, binary_name: &str) -> Option<Vec<u8>> {
        let path = self.ensure_index().get(binary_name)?.clone();
        std::fs::read(&path).ok()
    }
}

struct ArchiveEntry {
    reader: ArchiveReader<File>,
}

impl ArchiveEntry {
    fn lookup(&mut self, binary_name: &str) -> Option<Vec<u8>> {
        self.reader.read(&format!("{binary_name}.class")).ok()
    }
}

enum Entry {
    Directory(DirEntry),
    Archive(ArchiveEntry),
}

impl Entry {
    fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ClassPathError::NotFound(path.to_path_buf()));
        }
        if path.is_dir() {
            Ok(Entry::Directory(DirEntry { root: path.to_path_buf(), index: None }))
        } else {
            let reader = ArchiveReader::open(path)
                .map_err(|source| ClassPathError::OpenArchive { path: path.to_path_buf(), source })?;
            Ok(Entry::Archive(ArchiveEntry { reader }))
        }
    }

    fn lookup(&mut self, binary_name: &str) -> Option<Vec<u8>> {
        match self {
            Entry::Directory(d) => d.lookup(binary_name),
            Entry::Archive(a) => a.lookup(binary_name),
        }
    }
}

/// An ordered classpath: project entries, then boot entries, each entry a
/// directory of `.class` files or a jar/zip archive.
pub struct ClassPath {
    project: Vec<Entry>,
    boot: Vec<Entry>,
}

impl ClassPath {
    pub fn new(project_paths: &[PathBuf], boot_paths: &[PathBuf]) -> Result<Self> {
        let project = project_paths.iter().map(|p| Entry::open(p)).collect::<Result<Vec<_>>>()?;
        let boot = boot_paths.iter().map(|p| Entry::open(p)).collect::<Result<Vec<_>>>()?;
        Ok(Self { project, boot })
    }
}

impl ClassPathLookup for ClassPath {
    fn lookup(&mut self, binary_name: &str) -> Option<Vec<u8>> {
        for entry in self.project.iter_mut().chain(self.boot.iter_mut()) {
            if let Some(bytes) = entry.lookup(binary_name) {
                tracing::debug!(binary_name, "classpath hit");
                return Some(bytes);
            }
        }
        tracing::debug!(binary_name, "classpath miss");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_a_class_file_under_a_directory_entry() {
        let dir = tempfile::tempdir().unwrap();
        let class_dir = dir.path().join("p");
        std::fs::create_dir_all(&class_dir).unwrap();
        std::fs::write(class_dir.join("Foo.class"), [0xCA, 0xFE, 0xBA, 0xBE]).unwrap();

        let mut classpath = ClassPath::new(&[dir.path().to_path_buf()], &[]).unwrap();
        assert_eq!(classpath.lookup("p/Foo"), Some(vec![0xCA, 0xFE, 0xBA, 0xBE]));
        assert_eq!(classpath.lookup("p/Missing"), None);
    }

    #[test]
    fn finds_a_class_file_under_an_archive_entry() {
        let dir = tempfile::tempdir().unwrap();
        let jar_path = dir.path().join("lib.jar");
        headc_archive::write_archive(&jar_path, &[("p/Bar.class".to_string(), vec![1, 2, 3])]).unwrap();

        let mut classpath = ClassPath::new(&[jar_path], &[]).unwrap();
        assert_eq!(classpath.lookup("p/Bar"), Some(vec![1, 2, 3]));
    }

    #[test]
    fn project_entries_shadow_boot_entries() {
        let project_dir = tempfile::tempdir().unwrap();
        let boot_dir = tempfile::tempdir().unwrap();
        std::fs::write(project_dir.path().join("Shadowed.class"), vec![1]).unwrap();
        std::fs::write(boot_dir.path().join("Shadowed.class"), vec![2]).unwrap();

        let mut classpath =
            ClassPath::new(&[project_dir.path().to_path_buf()], &[boot_dir.path().to_path_buf()]).unwrap();
        assert_eq!(classpath.lookup("Shadowed"), Some(vec![1]));
    }

    #[test]
    fn opening_a_missing_entry_is_an_error() {
        let missing = PathBuf::from("/nonexistent/classpath/entry");
        assert!(matches!(ClassPath::new(&[missing], &[]), Err(ClassPathError::NotFound(_))));
    }
}
