/// Entry point for the cgmeter cgroup metrics service.
///
/// This binary resolves the cgroup slice of the current process once at
/// startup and then serves point-in-time controller metrics (CPU, memory,
/// I/O, process counts) over a JSON HTTP API.
///
/// # Errors
///
/// Returns an error if initialization fails (e.g., no cgroup filesystem
/// mounted, an unreadable membership file, or invalid environment
/// configuration).
///
/// # Examples
///
/// ```bash
/// CGMETER_LISTEN=127.0.0.1:3000 cargo run
/// ```
#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    cgmeter::run().await
}
