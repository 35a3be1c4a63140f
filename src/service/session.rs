use crate::config::UploadConfig;
use crate::error::AppError;
use crate::models::{
    DocumentEdit, DocumentSummary, TotalsCheck, UploadedFile, VerificationRequest,
    VerificationResponse,
};
use serde::Serialize;

/// 扫描流程阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanPhase {
    Idle,
    Selected,
    Uploading,
    Succeeded,
    Failed,
}

#[derive(Debug, Default)]
enum SessionState {
    #[default]
    Idle,
    Selected(VerificationRequest),
    Uploading(UploadedFile),
    Succeeded {
        file: UploadedFile,
        result: VerificationResponse,
    },
    Failed {
        file: UploadedFile,
        error: String,
    },
}

/// 对外展示的会话快照
#[derive(Debug, Clone, Serialize)]
pub struct ScanSnapshot {
    pub phase: ScanPhase,
    pub file: Option<UploadedFile>,
    pub result: Option<VerificationResponse>,
    pub summary: Option<DocumentSummary>,
    pub totals: Option<TotalsCheck>,
    pub error: Option<String>,
}

/// 单文件扫描会话: idle -> selected -> uploading -> (succeeded | failed) -> idle
#[derive(Debug, Default)]
pub struct ScanSession {
    state: SessionState,
}

impl ScanSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> ScanPhase {
        match self.state {
            SessionState::Idle => ScanPhase::Idle,
            SessionState::Selected(_) => ScanPhase::Selected,
            SessionState::Uploading(_) => ScanPhase::Uploading,
            SessionState::Succeeded { .. } => ScanPhase::Succeeded,
            SessionState::Failed { .. } => ScanPhase::Failed,
        }
    }

    pub fn result(&self) -> Option<&VerificationResponse> {
        match &self.state {
            SessionState::Succeeded { result, .. } => Some(result),
            _ => None,
        }
    }

    /// 接收一个文件; 同一时间只允许一个
    pub fn select_file(
        &mut self,
        request: VerificationRequest,
        limits: &UploadConfig,
    ) -> Result<UploadedFile, AppError> {
        match self.state {
            SessionState::Idle | SessionState::Failed { .. } => {}
            SessionState::Uploading(_) => return Err(AppError::VerificationInProgress),
            SessionState::Selected(_) | SessionState::Succeeded { .. } => {
                return Err(AppError::FileAlreadySelected)
            }
        }

        if request.bytes.is_empty() {
            return Err(AppError::EmptyFile);
        }
        if request.bytes.len() > limits.max_bytes {
            return Err(AppError::FileTooLarge {
                size: request.bytes.len(),
                limit: limits.max_bytes,
            });
        }
        if !limits.accepts(&request.content_type) {
            return Err(AppError::UnsupportedContentType(request.content_type));
        }

        let info = request.info();
        tracing::info!(
            "File selected: {} ({}, {} bytes)",
            info.file_name,
            info.content_type,
            info.size
        );
        self.state = SessionState::Selected(request);
        Ok(info)
    }

    pub fn remove_file(&mut self) -> Result<UploadedFile, AppError> {
        match std::mem::take(&mut self.state) {
            SessionState::Selected(request) => {
                tracing::info!("File removed: {}", request.file_name);
                Ok(request.info())
            }
            other => {
                let err = match other {
                    SessionState::Uploading(_) => AppError::VerificationInProgress,
                    _ => AppError::NoFileSelected,
                };
                self.state = other;
                Err(err)
            }
        }
    }

    /// 取出待发送文件并进入 uploading
    pub fn begin_submit(&mut self) -> Result<VerificationRequest, AppError> {
        match std::mem::take(&mut self.state) {
            SessionState::Selected(request) => {
                self.state = SessionState::Uploading(request.info());
                Ok(request)
            }
            other => {
                let err = match other {
                    SessionState::Uploading(_) => AppError::VerificationInProgress,
                    _ => AppError::NoFileSelected,
                };
                self.state = other;
                Err(err)
            }
        }
    }

    /// 记录远程调用结果; 错误原样返回给调用方
    pub fn finish_submit(
        &mut self,
        outcome: Result<VerificationResponse, AppError>,
    ) -> Result<(), AppError> {
        let file = match std::mem::take(&mut self.state) {
            SessionState::Uploading(file) => file,
            other => {
                tracing::warn!("Verification finished outside of uploading phase, ignoring");
                self.state = other;
                return Err(outcome.err().unwrap_or(AppError::NoResult));
            }
        };

        match outcome {
            Ok(result) => {
                tracing::info!(
                    "Verification {} succeeded for {}: {}",
                    result.verification_id(),
                    file.file_name,
                    result.doc_type()
                );
                self.state = SessionState::Succeeded { file, result };
                Ok(())
            }
            Err(err) => {
                tracing::error!("Verification failed for {}: {}", file.file_name, err);
                self.state = SessionState::Failed {
                    file,
                    error: err.to_string(),
                };
                Err(err)
            }
        }
    }

    /// 用修改后的副本替换当前结果
    pub fn edit(&mut self, edit: &DocumentEdit) -> Result<&VerificationResponse, AppError> {
        match &mut self.state {
            SessionState::Succeeded { result, .. } => {
                let edited = result.apply_edit(edit)?;
                tracing::info!("Result {} edited", edited.verification_id());
                *result = edited;
                Ok(&*result)
            }
            SessionState::Uploading(_) => Err(AppError::VerificationInProgress),
            _ => Err(AppError::NoResult),
        }
    }

    /// 确认结果并清空会话
    pub fn confirm(&mut self) -> Result<VerificationResponse, AppError> {
        match std::mem::take(&mut self.state) {
            SessionState::Succeeded { file, result } => {
                tracing::info!(
                    "Result {} confirmed for {}",
                    result.verification_id(),
                    file.file_name
                );
                Ok(result)
            }
            other => {
                let err = match other {
                    SessionState::Uploading(_) => AppError::VerificationInProgress,
                    _ => AppError::NoResult,
                };
                self.state = other;
                Err(err)
            }
        }
    }

    /// 回到 idle; 上传中不可取消
    pub fn reset(&mut self) -> Result<(), AppError> {
        if let SessionState::Uploading(_) = self.state {
            return Err(AppError::VerificationInProgress);
        }
        self.state = SessionState::Idle;
        Ok(())
    }

    pub fn snapshot(&self) -> ScanSnapshot {
        let (file, result, error) = match &self.state {
            SessionState::Idle => (None, None, None),
            SessionState::Selected(request) => (Some(request.info()), None, None),
            SessionState::Uploading(file) => (Some(file.clone()), None, None),
            SessionState::Succeeded { file, result } => {
                (Some(file.clone()), Some(result.clone()), None)
            }
            SessionState::Failed { file, error } => {
                (Some(file.clone()), None, Some(error.clone()))
            }
        };

        ScanSnapshot {
            phase: self.phase(),
            summary: result.as_ref().map(VerificationResponse::summary),
            totals: result.as_ref().and_then(VerificationResponse::check_totals),
            file,
            result,
            error,
        }
    }
}
