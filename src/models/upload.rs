use serde::Serialize;

/// 待核验文件, 仅存在于内存中; 发送后或移除时丢弃
#[derive(Clone)]
pub struct VerificationRequest {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// 文件元信息 (不含内容)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub size: usize,
}

impl VerificationRequest {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    pub fn info(&self) -> UploadedFile {
        UploadedFile {
            file_name: self.file_name.clone(),
            content_type: self.content_type.clone(),
            size: self.bytes.len(),
        }
    }
}

impl std::fmt::Debug for VerificationRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerificationRequest")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}
