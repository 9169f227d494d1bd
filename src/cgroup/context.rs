//! The process-wide cgroup context: mode, container state, and the
//! controller path table.
//!
//! The trio is computed exactly once during initialization and is immutable
//! afterwards, so it can be shared freely across concurrent callers without
//! locking. Every metric operation resolves paths against this context and
//! performs its own independent read and parse; file contents are never
//! cached, since they are live kernel counters.

use std::path::{Path, PathBuf};

use crate::fsutil;
use crate::mountinfo::{self, CgroupMode};

use super::membership;
use super::parse::{self, FlatKeyedRow, Int64OrMax, NestedKeyedRow};
use super::paths;
use super::procs;
use super::safety;
use super::{Error, Result};

/// Startup configuration for [`CgroupContext::init`].
///
/// The defaults describe a regular Linux process; tests and callers with an
/// alternate view of the system (e.g., a host mount under `/rootfs`) can
/// point every probe elsewhere.
#[derive(Debug, Clone)]
pub struct CgroupConfig {
    /// Root of the cgroup filesystem.
    pub root: PathBuf,
    /// Forces the container state instead of detecting it.
    pub containerized: Option<bool>,
    /// Mountinfo file used for mode detection.
    pub mountinfo_path: PathBuf,
    /// Cgroup membership file of the current process.
    pub membership_path: PathBuf,
}

impl Default for CgroupConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("/sys/fs/cgroup"),
            containerized: None,
            mountinfo_path: PathBuf::from("/proc/self/mountinfo"),
            membership_path: PathBuf::from("/proc/self/cgroup"),
        }
    }
}

/// Immutable snapshot of the current process's cgroup placement.
#[derive(Debug)]
pub struct CgroupContext {
    mode: CgroupMode,
    containerized: bool,
    table: Vec<(String, PathBuf)>,
}

impl CgroupContext {
    /// Detects mode and container state and resolves the controller path
    /// table for the current process.
    ///
    /// Must run to completion before the context is shared; a failure here
    /// is fatal for every dependent metric call.
    ///
    /// # Errors
    ///
    /// - [`Error::Unavailable`] if no cgroup filesystem is mounted.
    /// - [`Error::Mountinfo`] if mode detection or root validation fails.
    /// - [`Error::Read`] / [`Error::Membership`] if the membership file
    ///   cannot be read or parsed.
    pub fn init(config: &CgroupConfig) -> Result<Self> {
        let mode = mountinfo::detect_cgroup_mode(&config.mountinfo_path)?;
        if mode == CgroupMode::Unavailable {
            return Err(Error::Unavailable);
        }

        let root = mountinfo::validate_cgroup_root(&config.root)?;
        let lines = membership::read_membership(&config.membership_path)?;
        let containerized = config
            .containerized
            .unwrap_or_else(|| membership::detect_containerized(mode, &lines));
        log::debug!("Cgroup mode: {mode}, containerized: {containerized}");

        let table = paths::build_controller_table(mode, containerized, &root, &lines)?;
        Ok(Self::new(mode, containerized, table))
    }

    /// Builds a context from already-resolved parts.
    ///
    /// Exists so tests and embedders can construct alternate configurations
    /// without touching process-wide state.
    pub fn new(mode: CgroupMode, containerized: bool, table: Vec<(String, PathBuf)>) -> Self {
        Self {
            mode,
            containerized,
            table,
        }
    }

    /// The host's cgroup mode.
    pub fn mode(&self) -> CgroupMode {
        self.mode
    }

    /// Whether the process is confined to a sub-slice of the host tree.
    pub fn containerized(&self) -> bool {
        self.containerized
    }

    /// The ordered controller → directory table.
    pub fn controller_paths(&self) -> &[(String, PathBuf)] {
        &self.table
    }

    /// Resolves a controller name to its cgroup directory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ControllerNotFound`] for a controller absent from
    /// the table.
    pub fn controller_path(&self, controller: &str) -> Result<&Path> {
        self.table
            .iter()
            .find(|(name, _)| name == controller)
            .map(|(_, dir)| dir.as_path())
            .ok_or_else(|| Error::ControllerNotFound {
                controller: controller.to_owned(),
            })
    }

    /// Validates a pseudo-file name and resolves it below the directory of
    /// its owning controller, derived from the name's prefix before the
    /// first `.` (`memory.max` → `memory`).
    fn metric_path(&self, file_name: &str) -> Result<PathBuf> {
        let name = safety::checked_file_name(file_name)?;
        let controller =
            safety::controller_prefix(name).ok_or_else(|| Error::UnsafeFileName {
                name: name.to_owned(),
            })?;
        Ok(self.controller_path(controller)?.join(name))
    }

    /// Reads a scalar pseudo-file as an [`Int64OrMax`].
    pub fn read_scalar(&self, file_name: &str) -> Result<Int64OrMax> {
        let path = self.metric_path(file_name)?;
        let lines = fsutil::read_lines(&path)?;
        parse::parse_scalar(&lines).map_err(|source| Error::Format { path, source })
    }

    /// Reads a flat-keyed pseudo-file into ordered `(key, value)` rows.
    pub fn read_flat_keyed(&self, file_name: &str) -> Result<Vec<FlatKeyedRow>> {
        let path = self.metric_path(file_name)?;
        let lines = fsutil::read_lines(&path)?;
        parse::parse_flat_keyed(&lines).map_err(|source| Error::Format { path, source })
    }

    /// Reads a nested-keyed pseudo-file into ordered rows of
    /// `(key, sub-entries)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedV1File`] under cgroup v1, which has no
    /// nested-keyed pseudo-files.
    pub fn read_nested_keyed(&self, file_name: &str) -> Result<Vec<NestedKeyedRow>> {
        if self.mode == CgroupMode::V1 {
            return Err(Error::UnsupportedV1File {
                file: file_name.to_owned(),
            });
        }

        let path = self.metric_path(file_name)?;
        let lines = fsutil::read_lines(&path)?;
        parse::parse_nested_keyed(&lines).map_err(|source| Error::Format { path, source })
    }

    /// Counts the processes attached to a controller's cgroup.
    ///
    /// With no controller given, the process's own slice is used: the
    /// unified directory under v2, the `memory` hierarchy under v1.
    pub fn process_count(&self, controller: Option<&str>) -> Result<usize> {
        let controller = controller.unwrap_or(match self.mode {
            CgroupMode::V2 => "cgroup",
            _ => "memory",
        });
        let dir = self.controller_path(controller)?;
        Ok(procs::count_processes(self.mode, dir))
    }
}
