#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();
    let config = kanban_server::config::Config::from_env()?;
    kanban_server::web::start_web_server(config).await
}
