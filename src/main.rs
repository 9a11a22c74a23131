#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tipbridge::node::run_cli().await
}
