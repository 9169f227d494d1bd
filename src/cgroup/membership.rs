//! Parsing of the process's cgroup membership file (`/proc/self/cgroup`).
//!
//! Each line has the shape `<hierarchy-id>:<controller-list>:<path>`:
//!
//! - v1: an arbitrary hierarchy id, a comma-separated controller list, and
//!   the path of those controllers' cgroup relative to the cgroup root.
//! - v2: always `0::<path>` with an empty controller list; the single path
//!   covers all controllers of the unified hierarchy.
//!
//! Containerization is inferred from these paths: a process confined to a
//! sub-slice of the tree reports a path below `/`, while a process at the
//! root of the host hierarchy reports `/` itself.

use std::path::Path;

use crate::fsutil;
use crate::mountinfo::CgroupMode;

use super::{Error, Result};

/// One parsed line of a cgroup membership file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipLine {
    /// Hierarchy id; `0` for the v2 unified hierarchy.
    pub hierarchy_id: u32,
    /// Controllers attached to the hierarchy; empty for v2.
    pub controllers: Vec<String>,
    /// Cgroup path relative to the cgroup root, always starting with `/`.
    pub path: String,
}

impl MembershipLine {
    /// Returns true for the `0::<path>` line of the unified hierarchy.
    pub fn is_unified(&self) -> bool {
        self.hierarchy_id == 0 && self.controllers.is_empty()
    }
}

/// Reads and parses a cgroup membership file.
///
/// # Errors
///
/// Returns [`Error::Read`] if the file cannot be read and
/// [`Error::Membership`] on a line that does not match the
/// `<id>:<controllers>:<path>` shape.
pub fn read_membership(path: impl AsRef<Path>) -> Result<Vec<MembershipLine>> {
    let path = path.as_ref();
    fsutil::read_lines(path)?
        .iter()
        .map(|content| parse_membership_line(content, path))
        .collect()
}

fn parse_membership_line(content: &str, origin: &Path) -> Result<MembershipLine> {
    let malformed = || Error::Membership {
        path: origin.to_path_buf(),
        line: content.to_owned(),
    };

    let mut fields = content.splitn(3, ':');
    let (Some(id), Some(controllers), Some(path)) = (fields.next(), fields.next(), fields.next())
    else {
        return Err(malformed());
    };

    let hierarchy_id = id.parse::<u32>().map_err(|_| malformed())?;
    if !path.starts_with('/') {
        return Err(malformed());
    }

    let controllers = controllers
        .split(',')
        .filter(|c| !c.is_empty())
        .map(str::to_owned)
        .collect();

    Ok(MembershipLine {
        hierarchy_id,
        controllers,
        path: path.to_owned(),
    })
}

/// Infers whether the current process is confined to a sub-slice of the
/// host's cgroup tree.
///
/// Under v2 the single unified membership line decides: a path other than
/// `/` means the process sits below the root it can see. Under v1 any
/// controller line reporting a non-root path counts, since container
/// runtimes move all controllers of a confined process at once.
pub fn detect_containerized(mode: CgroupMode, lines: &[MembershipLine]) -> bool {
    match mode {
        CgroupMode::V2 => lines
            .iter()
            .find(|line| line.is_unified())
            .is_some_and(|line| line.path != "/"),
        _ => lines
            .iter()
            .any(|line| !line.is_unified() && line.path != "/"),
    }
}
