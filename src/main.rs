#[tokio::main]
async fn main() -> anyhow::Result<()> {
    inkdesk::cli::run().await
}
