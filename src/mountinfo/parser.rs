//! Mountinfo line parser for Linux systems.
//!
//! Parses lines in `/proc/[pid]/mountinfo` format. See
//! [`proc_pid_mountinfo(5)`](https://man7.org/linux/man-pages/man5/proc_pid_mountinfo.5.html)
//! for details on the structure. Only the fields consumed by mount
//! classification are surfaced; the mount/parent IDs, device numbers, and
//! optional fields are validated for presence but not retained.

/// The subset of a parsed mountinfo line needed to classify cgroup mounts.
#[derive(Debug, PartialEq, Eq)]
pub struct MountEntry<'a> {
    /// Root of the mount within the filesystem.
    pub root: &'a str,
    /// Mount point relative to the process's root.
    pub mount_point: &'a str,
    /// Filesystem type (e.g., `ext4`, `cgroup`, `cgroup2`).
    pub fs_type: &'a str,
    /// Superblock options; for v1 cgroup mounts these name the attached
    /// controllers (e.g., `rw,memory`).
    pub super_options: &'a str,
}

/// Errors that may occur when parsing a mountinfo line.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("missing separator ` - ` in line: `{0}`")]
    MissingSeparator(String),

    #[error("missing `{field}` field in line: `{line}`")]
    MissingField { field: &'static str, line: String },
}

fn next_field<'a>(
    fields: &mut impl Iterator<Item = &'a str>,
    field: &'static str,
    line: &str,
) -> Result<&'a str, ParseError> {
    fields.next().ok_or_else(|| ParseError::MissingField {
        field,
        line: line.to_owned(),
    })
}

/// Parses a single line of mountinfo data.
///
/// The line must follow the Linux kernel format described in
/// [`proc_pid_mountinfo(5)`](https://man7.org/linux/man-pages/man5/proc_pid_mountinfo.5.html).
/// Parsing is zero-allocation on the success path: the returned
/// [`MountEntry`] borrows from the input line.
///
/// # Errors
///
/// Returns [`ParseError`] variants for a missing separator or missing
/// required fields.
pub fn parse_mount_entry(line: &str) -> Result<MountEntry<'_>, ParseError> {
    let (pre, post) = line
        .split_once(" - ")
        .ok_or_else(|| ParseError::MissingSeparator(line.to_owned()))?;

    // Pre-separator: mount ID, parent ID, major:minor, root, mount point,
    // then a variable number of optional fields we do not need.
    let mut pre_fields = pre.split_whitespace();
    next_field(&mut pre_fields, "mount_id", line)?;
    next_field(&mut pre_fields, "parent_id", line)?;
    next_field(&mut pre_fields, "major:minor", line)?;
    let root = next_field(&mut pre_fields, "root", line)?;
    let mount_point = next_field(&mut pre_fields, "mount_point", line)?;

    let mut post_fields = post.split_whitespace();
    let fs_type = next_field(&mut post_fields, "fs_type", line)?;
    next_field(&mut post_fields, "source", line)?;
    let super_options = next_field(&mut post_fields, "super_options", line)?;

    Ok(MountEntry {
        root,
        mount_point,
        fs_type,
        super_options,
    })
}
