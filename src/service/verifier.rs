use crate::config::VerificationConfig;
use crate::error::AppError;
use crate::models::{VerificationRequest, VerificationResponse};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

/// 远程核验服务的调用接口
#[async_trait]
pub trait VerificationClient: Send + Sync {
    /// 发送一个文件, 返回发票或收据结果
    async fn start_verification(
        &self,
        request: &VerificationRequest,
    ) -> Result<VerificationResponse, AppError>;
}

/// 远程服务 4xx 返回体
#[derive(Debug, Deserialize)]
pub struct UpstreamErrorBody {
    pub detail: Vec<UpstreamErrorDetail>,
}

#[derive(Debug, Deserialize)]
pub struct UpstreamErrorDetail {
    #[serde(rename = "type")]
    pub kind: String,
    /// 字段路径, 可混有数组下标
    #[serde(default)]
    pub loc: Vec<serde_json::Value>,
    pub msg: String,
    #[serde(default)]
    pub input: Option<serde_json::Value>,
}

impl UpstreamErrorBody {
    fn describe(&self) -> String {
        self.detail
            .iter()
            .map(|d| {
                if d.loc.is_empty() {
                    format!("{} ({})", d.msg, d.kind)
                } else {
                    let path = d
                        .loc
                        .iter()
                        .map(|part| match part {
                            serde_json::Value::String(name) => name.clone(),
                            other => other.to_string(),
                        })
                        .collect::<Vec<_>>()
                        .join(".");
                    format!("{}: {} ({})", path, d.msg, d.kind)
                }
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// 基于 reqwest 的实现: `POST {base_url}/start_verification`, multipart 字段 `file`
pub struct HttpVerificationClient {
    client: reqwest::Client,
    endpoint: String,
    api_token: Option<String>,
}

impl HttpVerificationClient {
    pub fn new(config: &VerificationConfig) -> Result<Self, AppError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| AppError::Config(format!("http client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: format!("{}/start_verification", config.base_url.trim_end_matches('/')),
            api_token: config.api_token.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl VerificationClient for HttpVerificationClient {
    async fn start_verification(
        &self,
        request: &VerificationRequest,
    ) -> Result<VerificationResponse, AppError> {
        let part = Part::bytes(request.bytes.clone())
            .file_name(request.file_name.clone())
            .mime_str(&request.content_type)
            .map_err(|e| AppError::UnsupportedContentType(format!("{}: {}", request.content_type, e)))?;
        let form = Form::new().part("file", part);

        let mut builder = self
            .client
            .post(&self.endpoint)
            .header(ACCEPT, "application/json")
            .multipart(form);
        if let Some(token) = &self.api_token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        tracing::info!(
            "POST {} file={} size={}",
            self.endpoint,
            request.file_name,
            request.bytes.len()
        );

        let response = builder
            .send()
            .await
            .map_err(|e| AppError::Transport(e.to_string()))?;
        let status = response.status();

        if status.is_success() {
            let body = response
                .bytes()
                .await
                .map_err(|e| AppError::Transport(e.to_string()))?;
            return serde_json::from_slice::<VerificationResponse>(&body)
                .map_err(|e| AppError::MalformedResponse(e.to_string()));
        }

        tracing::warn!("Verification service answered {}", status);
        match status {
            StatusCode::UNAUTHORIZED => Err(AppError::Unauthorized),
            StatusCode::TOO_MANY_REQUESTS => Err(AppError::RateLimited),
            StatusCode::SERVICE_UNAVAILABLE => Err(AppError::ServiceUnavailable),
            _ => {
                let text = response
                    .text()
                    .await
                    .map_err(|e| AppError::Transport(e.to_string()))?;
                let detail = match serde_json::from_str::<UpstreamErrorBody>(&text) {
                    Ok(body) => body.describe(),
                    Err(_) => text,
                };
                Err(AppError::Rejected {
                    status: status.as_u16(),
                    detail,
                })
            }
        }
    }
}
