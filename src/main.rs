use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    caverna::cli::run_cli().await
}
