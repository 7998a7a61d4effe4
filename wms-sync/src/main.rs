use wms_sync::{Server, ServerState, print_banner, setup_environment};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. 设置环境 (dotenv, 日志)，加载配置
    let config = setup_environment()?;

    print_banner();
    tracing::info!(
        environment = %config.environment,
        interval_secs = config.sync.interval.as_secs(),
        "WMS sync starting..."
    );

    // 2. 初始化服务状态 (审计日志、数据库、ERP 客户端、引擎)
    let state = ServerState::initialize(&config).await?;

    // 3. 启动 HTTP 服务器 (Server::run 会启动调度器)
    let server = Server::with_state(config, state);

    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
