//! Peon binary entry point.

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    peon::cli::run().await
}
