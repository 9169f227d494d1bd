use std::path::PathBuf;
use std::sync::Arc;

/// cgmeter: serves kernel cgroup-controller metrics (CPU, memory, I/O,
/// process counts) for the current process's slice over a JSON HTTP API.
///
/// This library provides the core functionality for detecting the host's
/// cgroup mode (v1, v2, or hybrid), resolving the per-controller cgroup
/// directories of the current process, and parsing the cgroup pseudo-file
/// formats into tabular records.
pub mod api;
pub mod cgroup;
pub mod error;
pub mod fsutil;
pub mod mountinfo;

/// Runs the cgmeter service.
///
/// Reads configuration from the environment, initializes the immutable
/// cgroup context exactly once, and then serves the metrics API. The
/// context never changes afterwards; a configuration change requires a
/// restart.
///
/// # Environment
///
/// - `CGMETER_CGROUP_ROOT` - cgroup filesystem root (default
///   `/sys/fs/cgroup`).
/// - `CGMETER_CONTAINERIZED` - `true`/`false` to force the container
///   state instead of detecting it.
/// - `CGMETER_LISTEN` - listen address (default `0.0.0.0:3000`).
///
/// # Errors
///
/// Possible errors include:
/// - No cgroup filesystem mounted, or an invalid cgroup root.
/// - Failure to read the process's cgroup membership file.
/// - An invalid `CGMETER_CONTAINERIZED` value.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = cgroup::CgroupConfig::default();
    if let Some(root) = std::env::var_os("CGMETER_CGROUP_ROOT") {
        config.root = PathBuf::from(root);
    }
    if let Ok(value) = std::env::var("CGMETER_CONTAINERIZED") {
        let forced = value.parse::<bool>().map_err(|_| {
            format!("invalid value `{value}` for CGMETER_CONTAINERIZED, expected `true` or `false`")
        })?;
        config.containerized = Some(forced);
    }

    let ctx = cgroup::CgroupContext::init(&config)?;
    log::debug!(
        "Initialized cgroup context: mode {}, containerized: {}",
        ctx.mode(),
        ctx.containerized()
    );
    for (controller, path) in ctx.controller_paths() {
        log::debug!("Controller `{}` -> {}", controller, path.display());
    }

    let listen = std::env::var("CGMETER_LISTEN").unwrap_or_else(|_| "0.0.0.0:3000".to_owned());
    let api = api::ApiServer::new(Arc::new(ctx));
    log::debug!("Listening on {listen}");
    api.listen(listen).await;

    Ok(())
}
