#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dashboard_tutor_lib::run().await
}
