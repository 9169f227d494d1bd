//! Counting of processes attached to a cgroup.
//!
//! Reads the `cgroup.procs` pseudo-file of a controller directory. Under v2
//! processes may be attached only to leaf cgroups, so the walk recurses
//! through descendant directories and de-duplicates the collected pids
//! before counting. An empty or non-existent cgroup legitimately has no
//! members, so the count is best-effort by contract: unreadable parts are
//! logged and skipped, never surfaced as errors.

use std::collections::VecDeque;
use std::io;
use std::path::Path;

use crate::error::ResultOkLogExt;
use crate::fsutil;
use crate::mountinfo::CgroupMode;

const PROCS_FILE: &str = "cgroup.procs";

/// Counts the distinct process identifiers attached to the cgroup at `dir`.
///
/// Under [`CgroupMode::V2`] descendant cgroups are included; under v1 the
/// kernel lists every member in the directory's own `cgroup.procs`, so no
/// recursion is needed. Returns 0 for an empty or missing cgroup.
pub fn count_processes(mode: CgroupMode, dir: &Path) -> usize {
    let mut pids = Vec::new();

    match mode {
        CgroupMode::V2 => collect_tree_pids(dir, &mut pids),
        _ => collect_pids_from(&dir.join(PROCS_FILE), &mut pids),
    }

    pids.sort_unstable();
    pids.dedup();
    pids.len()
}

/// Walks `dir` and all descendant directories with an explicit stack,
/// collecting pids from each level's `cgroup.procs`.
fn collect_tree_pids(dir: &Path, pids: &mut Vec<u64>) {
    let mut stack = VecDeque::new();
    stack.push_back(dir.to_path_buf());

    while let Some(path) = stack.pop_back() {
        collect_pids_from(&path.join(PROCS_FILE), pids);

        let Some(entries) = read_dir_entries(&path) else {
            continue;
        };
        for entry in entries.filter_map(|entry| entry.ok_log()) {
            let Some(ft) = entry.file_type().ok_log() else {
                continue;
            };
            if ft.is_dir() {
                stack.push_back(entry.path());
            }
        }
    }
}

fn read_dir_entries(path: &Path) -> Option<std::fs::ReadDir> {
    match std::fs::read_dir(path) {
        Ok(entries) => Some(entries),
        Err(err) if err.kind() == io::ErrorKind::NotFound => None,
        Err(err) => {
            log::warn!(
                "skipping unreadable cgroup directory `{}`: {err}",
                path.display()
            );
            None
        }
    }
}

fn collect_pids_from(path: &Path, pids: &mut Vec<u64>) {
    let lines = match fsutil::read_lines(path) {
        Ok(lines) => lines,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return,
        Err(err) => {
            log::warn!("skipping unreadable process list: {err}");
            return;
        }
    };

    for line in lines {
        match line.trim().parse::<u64>() {
            Ok(pid) => pids.push(pid),
            Err(_) => log::warn!(
                "ignoring non-numeric entry `{line}` in `{}`",
                path.display()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_procs(dir: &Path, pids: &str) {
        std::fs::create_dir_all(dir).unwrap();
        std::fs::write(dir.join(PROCS_FILE), pids).unwrap();
    }

    #[test]
    fn test_missing_cgroup_counts_zero() {
        let root = tempfile::tempdir().unwrap();
        let gone = root.path().join("does-not-exist");
        assert_eq!(count_processes(CgroupMode::V2, &gone), 0);
        assert_eq!(count_processes(CgroupMode::V1, &gone), 0);
    }

    #[test]
    fn test_empty_cgroup_counts_zero() {
        let root = tempfile::tempdir().unwrap();
        write_procs(root.path(), "");
        assert_eq!(count_processes(CgroupMode::V2, root.path()), 0);
    }

    #[test]
    fn test_v1_counts_single_file_only() {
        let root = tempfile::tempdir().unwrap();
        write_procs(root.path(), "100\n200\n300\n");
        write_procs(&root.path().join("child"), "400\n");

        assert_eq!(count_processes(CgroupMode::V1, root.path()), 3);
    }

    #[test]
    fn test_v2_recurses_into_descendants() {
        let root = tempfile::tempdir().unwrap();
        write_procs(root.path(), "");
        write_procs(&root.path().join("leaf-a"), "100\n200\n");
        write_procs(&root.path().join("mid/leaf-b"), "300\n");

        assert_eq!(count_processes(CgroupMode::V2, root.path()), 3);
    }

    #[test]
    fn test_v2_deduplicates_pids_across_levels() {
        let root = tempfile::tempdir().unwrap();
        write_procs(root.path(), "100\n");
        write_procs(&root.path().join("leaf"), "100\n200\n");

        assert_eq!(count_processes(CgroupMode::V2, root.path()), 2);
    }

    #[test]
    fn test_non_numeric_entries_are_skipped() {
        let root = tempfile::tempdir().unwrap();
        write_procs(root.path(), "100\nnot-a-pid\n200\n");

        assert_eq!(count_processes(CgroupMode::V2, root.path()), 2);
    }
}
