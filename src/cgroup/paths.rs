//! Resolution of controller names to absolute cgroup directories.
//!
//! Under v2 all controllers share the unified hierarchy: the single
//! membership path, joined below the configured root, serves every
//! controller listed in that directory's `cgroup.controllers`. Under v1
//! each membership line names its own sub-path per controller, mounted at
//! `<root>/<controller>`.
//!
//! A containerized process is a special case in both modes: the membership
//! path it reports names a host-side location that does not exist inside
//! its mount namespace, so the configured root itself is the process's
//! slice.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::fsutil;
use crate::mountinfo::CgroupMode;

use super::membership::MembershipLine;
use super::{Error, Result};

/// Meta entry present in every v2 table; `cgroup.*` files live in the
/// unified directory alongside the controller files.
const CGROUP_META_CONTROLLER: &str = "cgroup";

/// Builds the controller → directory table for the current process.
///
/// The table preserves membership-file order, keys are unique (first entry
/// wins), and a controller absent from the membership file simply yields no
/// entry.
///
/// # Errors
///
/// - [`Error::Unavailable`] if no cgroup filesystem is mounted.
/// - [`Error::MissingV2Membership`] if a v2 host lacks the `0::` line.
/// - [`Error::EscapesRoot`] if a reported path would resolve outside the
///   configured root.
/// - [`Error::Read`] if the v2 `cgroup.controllers` file cannot be read.
pub fn build_controller_table(
    mode: CgroupMode,
    containerized: bool,
    root: &Path,
    lines: &[MembershipLine],
) -> Result<Vec<(String, PathBuf)>> {
    match mode {
        CgroupMode::V2 => build_v2_table(containerized, root, lines),
        CgroupMode::V1 => build_v1_table(containerized, root, lines),
        CgroupMode::Unavailable => Err(Error::Unavailable),
    }
}

fn build_v2_table(
    containerized: bool,
    root: &Path,
    lines: &[MembershipLine],
) -> Result<Vec<(String, PathBuf)>> {
    let unified = lines
        .iter()
        .find(|line| line.is_unified())
        .ok_or(Error::MissingV2Membership)?;

    let dir = if containerized {
        root.to_path_buf()
    } else {
        join_below_root(root, &unified.path)?
    };
    log::debug!("Unified cgroup directory: {}", dir.display());

    let mut table = vec![(CGROUP_META_CONTROLLER.to_owned(), dir.clone())];
    for controller in enabled_v2_controllers(&dir)? {
        table.push((controller, dir.clone()));
    }

    Ok(table)
}

/// Enumerates the controllers enabled in a unified-hierarchy directory from
/// its `cgroup.controllers` file (one line of space-separated names).
fn enabled_v2_controllers(dir: &Path) -> Result<Vec<String>> {
    let lines = fsutil::read_lines(dir.join("cgroup.controllers"))?;
    let controllers = lines
        .first()
        .map(|line| line.split_whitespace().map(str::to_owned).collect())
        .unwrap_or_default();
    Ok(controllers)
}

fn build_v1_table(
    containerized: bool,
    root: &Path,
    lines: &[MembershipLine],
) -> Result<Vec<(String, PathBuf)>> {
    let mut table = Vec::new();
    let mut seen = HashSet::new();

    for line in lines.iter().filter(|line| !line.is_unified()) {
        for controller in &line.controllers {
            // Named hierarchies (`name=systemd`) carry no resource metrics.
            if controller.starts_with("name=") {
                continue;
            }
            if !seen.insert(controller.clone()) {
                continue;
            }

            let mount = root.join(controller);
            let dir = if containerized {
                mount
            } else {
                join_below_root(&mount, &line.path)?
            };
            log::debug!("Controller `{}` directory: {}", controller, dir.display());
            table.push((controller.clone(), dir));
        }
    }

    Ok(table)
}

/// Joins a kernel-reported cgroup path below the given root.
///
/// The reported path is absolute within the hierarchy; its leading `/` is
/// stripped and the remainder appended component-wise. A `..` component is
/// rejected rather than resolved, so the result can never leave the root.
fn join_below_root(root: &Path, reported: &str) -> Result<PathBuf> {
    let mut dir = root.to_path_buf();
    for component in reported.split('/').filter(|c| !c.is_empty()) {
        if component == ".." {
            return Err(Error::EscapesRoot {
                root: root.to_path_buf(),
                reported: reported.to_owned(),
            });
        }
        dir.push(component);
    }
    Ok(dir)
}
