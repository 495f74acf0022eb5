//! segdemo CLI tool
//!
//! Command-line front end for the segdemo library: cutouts, latency
//! benchmarks and device information.

#[cfg(feature = "cli")]
use segdemo::cli;

#[cfg(feature = "cli")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cli::main().await
}

#[cfg(not(feature = "cli"))]
fn main() {
    panic!("CLI feature not enabled. Please rebuild with --features cli");
}
