pub mod handlers;

pub use handlers::*;

use crate::service::{ChatAdvisor, ScanService};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower::ServiceBuilder;

/// multipart 边界和表单头的余量
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// 共享状态：扫描服务 + 聊天顾问
#[derive(Clone)]
pub struct AppState {
    pub scan: Arc<ScanService>,
    pub advisor: Arc<Mutex<ChatAdvisor>>,
}

impl AppState {
    pub fn new(scan: ScanService) -> Self {
        Self {
            scan: Arc::new(scan),
            advisor: Arc::new(Mutex::new(ChatAdvisor::new())),
        }
    }
}

/// 构建路由
pub fn router(state: AppState) -> Router {
    let body_limit = state.scan.limits().max_bytes + MULTIPART_OVERHEAD;

    let scan_routes: Router<AppState> = Router::new()
        .route("/api/scan", get(scan_status))
        .route("/api/scan/file", post(upload_file).delete(remove_file))
        .route("/api/scan/verify", post(start_verification))
        .route("/api/scan/result", patch(edit_result))
        .route("/api/scan/confirm", post(confirm_result))
        .route("/api/scan/reset", post(reset_session))
        .route("/api/scan/transactions.csv", get(export_transactions));

    let chat_routes: Router<AppState> = Router::new()
        .route("/api/chat", get(chat_history).post(chat_send))
        .route("/api/chat/quick-actions", get(chat_quick_actions));

    Router::new()
        .route("/health", get(health_check))
        .merge(scan_routes)
        .merge(chat_routes)
        .layer(ServiceBuilder::new().layer(DefaultBodyLimit::max(body_limit)))
        .with_state(state)
}
