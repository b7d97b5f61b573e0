#[tokio::main]
async fn main() -> anyhow::Result<()> {
    campaign_console::run().await
}
