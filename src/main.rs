use specmock::config::DEFAULT_CONFIG_PATH;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    specmock::run_app(&config_path).await
}
