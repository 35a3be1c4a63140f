use crate::config::UploadConfig;
use crate::error::AppError;
use crate::models::{DocumentEdit, UploadedFile, VerificationRequest, VerificationResponse};
use crate::service::export;
use crate::service::session::{ScanSession, ScanSnapshot};
use crate::service::verifier::VerificationClient;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// 扫描服务: 持有单个会话, 负责调度远程核验
///
/// 会话锁只在同步操作内持有, 从不跨越 await
pub struct ScanService {
    client: Arc<dyn VerificationClient>,
    limits: UploadConfig,
    session: Mutex<ScanSession>,
}

/// uploading 期间持有; 请求 future 被丢弃时把会话置为 failed
struct InFlight<'a> {
    session: &'a Mutex<ScanSession>,
    armed: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.armed {
            let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
            let _ = session.finish_submit(Err(AppError::Cancelled));
        }
    }
}

impl ScanService {
    pub fn new(client: Arc<dyn VerificationClient>, limits: UploadConfig) -> Self {
        Self {
            client,
            limits,
            session: Mutex::new(ScanSession::new()),
        }
    }

    pub fn limits(&self) -> &UploadConfig {
        &self.limits
    }

    fn session(&self) -> MutexGuard<'_, ScanSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub async fn snapshot(&self) -> ScanSnapshot {
        self.session().snapshot()
    }

    pub async fn select_file(&self, request: VerificationRequest) -> Result<UploadedFile, AppError> {
        self.session().select_file(request, &self.limits)
    }

    pub async fn remove_file(&self) -> Result<UploadedFile, AppError> {
        self.session().remove_file()
    }

    /// 发送当前文件; 每个文件只发起一次远程调用
    pub async fn submit(&self) -> Result<ScanSnapshot, AppError> {
        let request = self.session().begin_submit()?;
        let mut in_flight = InFlight {
            session: &self.session,
            armed: true,
        };

        let outcome = self.client.start_verification(&request).await;
        drop(request);

        in_flight.armed = false;
        let mut session = self.session();
        session.finish_submit(outcome)?;
        Ok(session.snapshot())
    }

    pub async fn edit(&self, edit: &DocumentEdit) -> Result<ScanSnapshot, AppError> {
        let mut session = self.session();
        session.edit(edit)?;
        Ok(session.snapshot())
    }

    pub async fn confirm(&self) -> Result<VerificationResponse, AppError> {
        self.session().confirm()
    }

    pub async fn reset(&self) -> Result<ScanSnapshot, AppError> {
        let mut session = self.session();
        session.reset()?;
        tracing::info!("Scan session reset");
        Ok(session.snapshot())
    }

    /// 当前结果的记账流水 (CSV)
    pub async fn transactions_csv(&self) -> Result<String, AppError> {
        let session = self.session();
        let result = session.result().ok_or(AppError::NoResult)?;
        export::transactions_to_csv(result.transactions())
    }
}
