//! Cgroup-awareness layer: slice resolution and metric reads for the
//! current process.
//!
//! This module locates the cgroup directories that account for the current
//! process and parses their pseudo-files into tabular records. It handles
//! both kernel ABIs: the v1 per-controller hierarchies and the v2 unified
//! hierarchy (hybrid hosts resolve like v1).
//!
//! # Key Components
//!
//! - [`CgroupContext`] — the immutable mode / container-state / path-table
//!   trio, computed once at startup, plus the metric read operations.
//! - [`membership`] — parsing of `/proc/self/cgroup` and containerization
//!   detection.
//! - [`paths`] — controller → directory resolution below the configured
//!   root.
//! - [`parse`] — fail-fast parsers for the flat-keyed, nested-keyed, and
//!   scalar pseudo-file formats.
//! - [`procs`] — member process counting, recursive under v2.
//! - [`safety`] — validation of caller-supplied pseudo-file names.
//!
//! # Platform Requirements
//!
//! - Linux with cgroup v1 or v2 support.
//! - Read access to `/sys/fs/cgroup`, `/proc/self/mountinfo`, and
//!   `/proc/self/cgroup`.
mod context;
mod error;
pub mod membership;
pub mod parse;
pub mod paths;
pub mod procs;
pub mod safety;

pub use context::{CgroupConfig, CgroupContext};
pub use error::{Error, Result};
pub use parse::{FlatKeyedRow, Int64OrMax, NestedKeyedRow};
