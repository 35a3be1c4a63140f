use crate::api::AppState;
use crate::error::AppError;
use crate::models::{ChatMessage, DocumentEdit, QuickAction, UploadedFile, VerificationRequest, VerificationResponse};
use crate::service::ScanSnapshot;
use axum::{
    extract::{Json, Multipart, State},
    http::header,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};

/// 统一响应体
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    fn ok(message: impl Into<String>, data: T) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.into(),
            data: Some(data),
        })
    }
}

/// 聊天请求体
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub reply: ChatMessage,
    pub history_len: usize,
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// 当前扫描状态
pub async fn scan_status(State(state): State<AppState>) -> Json<ApiResponse<ScanSnapshot>> {
    let snapshot = state.scan.snapshot().await;
    ApiResponse::ok(format!("Scan session is {:?}", snapshot.phase), snapshot)
}

/// 上传文件 (multipart 字段 `file`, 仅一个)
pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<UploadedFile>>, AppError> {
    let mut selected: Option<VerificationRequest> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Multipart(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        if selected.is_some() {
            return Err(AppError::FileAlreadySelected);
        }

        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Multipart(e.to_string()))?;
        selected = Some(VerificationRequest::new(file_name, content_type, bytes.to_vec()));
    }

    let request = selected.ok_or(AppError::NoFileSelected)?;
    let info = state.scan.select_file(request).await?;
    Ok(ApiResponse::ok(format!("File {} ready for verification", info.file_name), info))
}

/// 移除待核验文件
pub async fn remove_file(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<UploadedFile>>, AppError> {
    let info = state.scan.remove_file().await?;
    Ok(ApiResponse::ok(format!("File {} removed", info.file_name), info))
}

/// 发送到远程核验服务
pub async fn start_verification(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ScanSnapshot>>, AppError> {
    let snapshot = state.scan.submit().await?;
    let message = match &snapshot.summary {
        Some(summary) => format!(
            "Verified {} {} from {}",
            summary.doc_type, summary.verification_id, summary.party
        ),
        None => "Verification finished".to_string(),
    };
    Ok(ApiResponse::ok(message, snapshot))
}

/// 修改结果字段
pub async fn edit_result(
    State(state): State<AppState>,
    Json(edit): Json<DocumentEdit>,
) -> Result<Json<ApiResponse<ScanSnapshot>>, AppError> {
    let snapshot = state.scan.edit(&edit).await?;
    Ok(ApiResponse::ok("Document details updated successfully", snapshot))
}

/// 确认结果, 会话回到初始状态
pub async fn confirm_result(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<VerificationResponse>>, AppError> {
    let result = state.scan.confirm().await?;
    Ok(ApiResponse::ok("Document saved successfully", result))
}

/// 重置会话, 关闭错误提示
pub async fn reset_session(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ScanSnapshot>>, AppError> {
    let snapshot = state.scan.reset().await?;
    Ok(ApiResponse::ok("Scan session reset", snapshot))
}

/// 记账流水 CSV 导出
pub async fn export_transactions(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let csv = state.scan.transactions_csv().await?;
    Ok(([(header::CONTENT_TYPE, "text/csv; charset=utf-8")], csv))
}

/// 聊天记录
pub async fn chat_history(State(state): State<AppState>) -> Json<ApiResponse<Vec<ChatMessage>>> {
    let history = state.advisor.lock().await.history().to_vec();
    ApiResponse::ok(format!("{} messages", history.len()), history)
}

/// 快捷提问
pub async fn chat_quick_actions(
    State(state): State<AppState>,
) -> Json<ApiResponse<Vec<QuickAction>>> {
    let actions = state.advisor.lock().await.quick_actions().to_vec();
    ApiResponse::ok("Quick actions", actions)
}

/// 发送聊天消息, 返回回复
pub async fn chat_send(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ApiResponse<ChatReply>>, AppError> {
    let mut advisor = state.advisor.lock().await;
    let reply = advisor.send(&req.message)?.clone();
    let history_len = advisor.history().len();
    Ok(ApiResponse::ok("Reply generated", ChatReply { reply, history_len }))
}
