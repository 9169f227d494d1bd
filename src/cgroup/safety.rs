//! Validation of caller-supplied pseudo-file names.
//!
//! The metric operations take a file name from an untrusted caller and join
//! it onto a resolved controller directory. This check runs before any I/O
//! and guards the read capability from being pointed at arbitrary host
//! files.

use super::{Error, Result};

/// Validates a caller-supplied cgroup pseudo-file name.
///
/// Accepted names look like `memory.stat`, `cpu.max`, or
/// `cpuset.cpus.effective`: a controller prefix, a `.`, and one or more
/// dot-separated components of ASCII alphanumerics, `_`, and `-`. Anything
/// else is rejected, in particular absolute paths, names containing a path
/// separator, and parent-directory traversal.
///
/// # Errors
///
/// Returns [`Error::UnsafeFileName`] for any rejected name.
pub fn checked_file_name(name: &str) -> Result<&str> {
    if is_valid_file_name(name) {
        Ok(name)
    } else {
        Err(Error::UnsafeFileName {
            name: name.to_owned(),
        })
    }
}

/// Extracts the controller prefix of a validated pseudo-file name
/// (`memory.max` → `memory`).
pub fn controller_prefix(name: &str) -> Option<&str> {
    name.split_once('.').map(|(prefix, _)| prefix)
}

fn is_valid_file_name(name: &str) -> bool {
    let mut components = name.split('.');

    // `split` yields at least one item; a valid name has a non-empty
    // controller prefix plus at least one more component, so `a.b` passes
    // and `max`, `.stat`, and `memory.` do not.
    let Some(prefix) = components.next() else {
        return false;
    };
    if prefix.is_empty() || !is_valid_component(prefix) {
        return false;
    }

    let mut rest = 0;
    for component in components {
        if !is_valid_component(component) {
            return false;
        }
        rest += 1;
    }

    rest > 0
}

fn is_valid_component(component: &str) -> bool {
    !component.is_empty()
        && component
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_cgroup_pseudo_file_names() {
        for name in [
            "memory.max",
            "memory.stat",
            "memory.pressure",
            "cgroup.procs",
            "cpu.cfs_quota_us",
            "cpuset.cpus.effective",
            "io.stat",
        ] {
            assert!(checked_file_name(name).is_ok(), "rejected `{name}`");
        }
    }

    #[test]
    fn test_rejects_traversal() {
        for name in ["../etc/passwd", "..", "memory/../..", "a..b"] {
            assert!(checked_file_name(name).is_err(), "accepted `{name}`");
        }
    }

    #[test]
    fn test_rejects_absolute_path() {
        assert!(checked_file_name("/etc/passwd").is_err());
    }

    #[test]
    fn test_rejects_path_separators() {
        assert!(checked_file_name("memory/stat").is_err());
        assert!(checked_file_name("memory.stat/x").is_err());
    }

    #[test]
    fn test_rejects_names_without_controller_prefix() {
        for name in ["", "max", ".stat", "memory."] {
            assert!(checked_file_name(name).is_err(), "accepted `{name}`");
        }
    }

    #[test]
    fn test_controller_prefix() {
        assert_eq!(controller_prefix("memory.max"), Some("memory"));
        assert_eq!(controller_prefix("cpuset.cpus.effective"), Some("cpuset"));
        assert_eq!(controller_prefix("max"), None);
    }
}
