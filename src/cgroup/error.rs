use std::path::PathBuf;

use crate::fsutil;

/// Errors that may occur while resolving cgroup paths or reading metrics.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no cgroup filesystem is mounted on this host")]
    Unavailable,

    #[error("unknown cgroup controller `{controller}`")]
    ControllerNotFound { controller: String },

    #[error("`{name}` is not an allowed cgroup pseudo-file name")]
    UnsafeFileName { name: String },

    #[error("file `{file}` is not supported under cgroup v1")]
    UnsupportedV1File { file: String },

    #[error("malformed cgroup membership line `{line}` in `{path}`")]
    Membership { path: PathBuf, line: String },

    #[error("no cgroup v2 membership entry for the current process")]
    MissingV2Membership,

    #[error("cgroup path `{reported}` would escape the root `{root}`")]
    EscapesRoot { root: PathBuf, reported: String },

    #[error(transparent)]
    Read(#[from] fsutil::FileReadError),

    #[error("unexpected format in `{path}`: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: super::parse::ParseError,
    },

    #[error(transparent)]
    Mountinfo(#[from] crate::mountinfo::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
