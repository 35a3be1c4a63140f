use scan_verify_rust::{router, AppConfig, AppState, HttpVerificationClient, ScanService};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 本地时间格式
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    // 加载配置: 指定了 SCAN_CONFIG 时使用文件 + SCAN_ 环境变量, 否则直接读环境变量
    let config = match std::env::var("SCAN_CONFIG").ok().map(PathBuf::from) {
        Some(path) => AppConfig::load(Some(path.as_path()))?,
        None => AppConfig::from_env(),
    };
    info!("Starting server with config: {:?}", config);

    // 远程核验客户端
    let client = HttpVerificationClient::new(&config.verification)?;
    info!("Verification endpoint: {}", client.endpoint());
    if config.verification.api_token.is_none() {
        tracing::warn!("No verification API token configured, requests are sent without Authorization");
    }

    let scan_service = ScanService::new(Arc::new(client), config.upload.clone());
    let app = router(AppState::new(scan_service));

    // 启动服务器
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  POST   /api/scan/file    - select one document (multipart `file`)");
    info!("  POST   /api/scan/verify  - send it for verification");
    info!("  PATCH  /api/scan/result  - edit the verified fields");
    info!("  POST   /api/scan/confirm - confirm and clear");
    info!("  POST   /api/chat         - financial advisor chat");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
