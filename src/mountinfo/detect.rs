use crate::fsutil;

use super::parser::parse_mount_entry;
use super::{Error, Result};
use std::io::BufRead;
use std::path::{Path, PathBuf};

/// The cgroup layout of the host, derived from its mount table.
///
/// Hybrid hosts carry both `cgroup` and `cgroup2` mounts; for path
/// resolution they behave like v1, so classification collapses them into
/// [`CgroupMode::V1`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CgroupMode {
    /// Legacy per-controller hierarchies (including hybrid setups).
    V1,
    /// Unified hierarchy.
    V2,
    /// No cgroup filesystem is mounted.
    Unavailable,
}

impl std::fmt::Display for CgroupMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CgroupMode::V1 => "v1",
            CgroupMode::V2 => "v2",
            CgroupMode::Unavailable => "unavailable",
        };
        write!(f, "{name}")
    }
}

/// Classifies the host's cgroup mode by parsing a Linux `mountinfo` file.
///
/// The file is scanned for entries with filesystem type `cgroup` (v1
/// per-controller hierarchies) and `cgroup2` (the unified hierarchy).
/// Any v1 mount makes the host [`CgroupMode::V1`], even when a `cgroup2`
/// mount coexists with it (hybrid). A host with only `cgroup2` mounts is
/// [`CgroupMode::V2`], and one with neither is [`CgroupMode::Unavailable`].
///
/// # Arguments
///
/// * `path` - Path to a Linux mountinfo file (e.g., `/proc/self/mountinfo`).
///
/// # Errors
///
/// - [`Error::FileOpen`] if the file can't be opened.
/// - [`Error::ReadLine`] if reading from the file fails.
/// - [`Error::Parse`] if parsing any line fails.
pub fn detect_cgroup_mode(path: impl AsRef<Path>) -> Result<CgroupMode> {
    let path = path.as_ref();
    let buf = fsutil::open_file_reader(path)?;

    detect_cgroup_mode_from_reader(buf, path)
}

/// Internal implementation for classifying the cgroup mode from a reader.
///
/// # Arguments
///
/// * `reader` - Buffered reader over the mountinfo content.
/// * `origin` - Logical origin of the data, used in error messages.
fn detect_cgroup_mode_from_reader<R: BufRead>(mut reader: R, origin: &Path) -> Result<CgroupMode> {
    let mut line = String::with_capacity(256);
    let mut saw_v1 = false;
    let mut saw_v2 = false;

    while reader
        .read_line(&mut line)
        .map_err(|source| Error::ReadLine {
            path: origin.to_path_buf(),
            source,
        })?
        != 0
    {
        let entry = parse_mount_entry(line.trim_end()).map_err(|source| Error::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        match entry.fs_type {
            "cgroup" => {
                log::debug!(
                    "Found `cgroup` v1 mount point with options `{}`: {}",
                    entry.super_options,
                    entry.mount_point
                );
                saw_v1 = true;
            }
            "cgroup2" => {
                log::debug!(
                    "Found `cgroup2` mount point with root `{}`: {}",
                    entry.root,
                    entry.mount_point
                );
                saw_v2 = true;
            }
            _ => {}
        }

        line.clear();
    }

    let mode = match (saw_v1, saw_v2) {
        (true, _) => CgroupMode::V1,
        (false, true) => CgroupMode::V2,
        (false, false) => CgroupMode::Unavailable,
    };
    Ok(mode)
}

/// Validates the configured cgroup root directory.
///
/// Returns the canonicalized absolute path, ensuring the path exists and is
/// a directory. Every controller path is later resolved below this root, so
/// it is pinned down once at startup.
///
/// # Errors
///
/// - [`Error::Canonicalization`] if the path cannot be canonicalized or accessed.
/// - [`Error::NotADirectory`] if the resolved path is not a directory.
pub fn validate_cgroup_root(root: impl AsRef<Path>) -> Result<PathBuf> {
    let root = root.as_ref();
    let canonical = std::fs::canonicalize(root).map_err(|e| Error::Canonicalization {
        path: root.to_path_buf(),
        source: e,
    })?;

    let metadata = std::fs::metadata(&canonical).map_err(|e| Error::Metadata {
        path: canonical.clone(),
        source: e,
    })?;

    if !metadata.is_dir() {
        return Err(Error::NotADirectory { path: canonical });
    }

    Ok(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn new_cursor_from_contents(contents: &str) -> Cursor<Vec<u8>> {
        Cursor::new(contents.as_bytes().to_vec())
    }

    #[test]
    fn test_detect_pure_v2() {
        let input =
            "42 35 0:39 / /sys/fs/cgroup rw nosuid,nodev,noexec,relatime - cgroup2 cgroup rw\n";
        let path = Path::new("/dummy");
        let reader = new_cursor_from_contents(input);

        let mode = detect_cgroup_mode_from_reader(reader, path).unwrap();
        assert_eq!(mode, CgroupMode::V2);
    }

    #[test]
    fn test_detect_pure_v1() {
        let input = "\
29 25 0:25 / /sys/fs/cgroup/cpu rw,nosuid,nodev,noexec,relatime - cgroup cgroup rw,cpu
30 25 0:26 / /sys/fs/cgroup/memory rw,nosuid,nodev,noexec,relatime - cgroup cgroup rw,memory
";
        let path = Path::new("/dummy");
        let reader = new_cursor_from_contents(input);

        let mode = detect_cgroup_mode_from_reader(reader, path).unwrap();
        assert_eq!(mode, CgroupMode::V1);
    }

    #[test]
    fn test_detect_hybrid_classified_as_v1() {
        let input = "\
30 25 0:26 / /sys/fs/cgroup/memory rw,nosuid,nodev,noexec,relatime - cgroup cgroup rw,memory
42 25 0:39 / /sys/fs/cgroup/unified rw,nosuid,nodev,noexec,relatime - cgroup2 cgroup rw
";
        let path = Path::new("/dummy");
        let reader = new_cursor_from_contents(input);

        let mode = detect_cgroup_mode_from_reader(reader, path).unwrap();
        assert_eq!(mode, CgroupMode::V1);
    }

    #[test]
    fn test_detect_no_cgroup_mounts() {
        let input = "25 1 0:24 / /proc rw,relatime - proc proc rw\n";
        let path = Path::new("/dummy");
        let reader = new_cursor_from_contents(input);

        let mode = detect_cgroup_mode_from_reader(reader, path).unwrap();
        assert_eq!(mode, CgroupMode::Unavailable);
    }

    #[test]
    fn test_detect_invalid_line() {
        let input = "invalid mountinfo line";
        let path = Path::new("/dummy");
        let reader = new_cursor_from_contents(input);

        let err = detect_cgroup_mode_from_reader(reader, path).unwrap_err();
        match err {
            Error::Parse { path: err_path, .. } => assert_eq!(err_path, path),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_detect_from_tempfile() {
        let mut tmp = NamedTempFile::new().unwrap();
        writeln!(
            tmp,
            "42 35 0:39 / /sys/fs/cgroup rw nosuid,nodev,noexec,relatime - cgroup2 cgroup rw"
        )
        .unwrap();

        let mode = detect_cgroup_mode(tmp.path()).unwrap();
        assert_eq!(mode, CgroupMode::V2);
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(CgroupMode::V1.to_string(), "v1");
        assert_eq!(CgroupMode::V2.to_string(), "v2");
        assert_eq!(CgroupMode::Unavailable.to_string(), "unavailable");
    }

    #[test]
    #[cfg(target_family = "unix")]
    fn test_validate_cgroup_root_symlink() {
        use std::os::unix::fs as unix_fs;
        let tempdir = tempfile::tempdir().unwrap();

        let symlink_path = tempdir.path().join("symlink_dir");
        unix_fs::symlink(tempdir.path(), &symlink_path).unwrap();

        let resolved = validate_cgroup_root(&symlink_path).unwrap();
        assert_eq!(resolved, std::fs::canonicalize(tempdir.path()).unwrap());
    }

    #[test]
    fn test_validate_cgroup_root_not_directory() {
        let tempdir = tempfile::tempdir().unwrap();
        let file_path = tempdir.path().join("file");
        std::fs::write(&file_path, "content").unwrap();

        let err = validate_cgroup_root(&file_path).unwrap_err();
        assert!(matches!(err, Error::NotADirectory { .. }));
    }

    #[test]
    fn test_validate_cgroup_root_missing() {
        let tempdir = tempfile::tempdir().unwrap();
        let err = validate_cgroup_root(tempdir.path().join("non_existent")).unwrap_err();
        assert!(matches!(err, Error::Canonicalization { .. }));
    }
}
