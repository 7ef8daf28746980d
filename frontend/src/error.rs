//! 客户端错误类型
//!
//! 所有跨模块的失败都归一为 `ClientError`：
//! - `kind`: 错误语义（决定页面如何处理）
//! - `message`: 可直接展示给用户的文本
//! - `spans`: 结构化的调用追踪栈

use std::fmt;

// =========================================================
// 错误类别
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientErrorKind {
    /// 后端返回非 2xx 状态码
    Remote { status: u16 },
    /// 响应 JSON 不符合任何已知的包装结构
    UnexpectedShape,
    /// 在 Provider 作用域之外访问上下文（编程错误）
    ContextUnavailable,
    /// 本地存储中的 JSON 无法解析（总是在本地恢复）
    StorageCorrupt,
    /// 网络层失败（请求未能完成）
    Network,
    /// 请求体或响应体的序列化失败
    Serialization,
}

impl ClientErrorKind {
    pub fn error_code(&self) -> &'static str {
        match self {
            ClientErrorKind::Remote { .. } => "REMOTE_ERROR",
            ClientErrorKind::UnexpectedShape => "UNEXPECTED_SHAPE",
            ClientErrorKind::ContextUnavailable => "CONTEXT_UNAVAILABLE",
            ClientErrorKind::StorageCorrupt => "STORAGE_CORRUPT",
            ClientErrorKind::Network => "NETWORK_ERROR",
            ClientErrorKind::Serialization => "SERIALIZATION_ERROR",
        }
    }
}

// =========================================================
// 错误上下文追踪
// =========================================================

/// 记录错误发生时的操作和相关细节
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorSpan {
    /// 操作名称，如 "gateway.get", "session.load"
    pub operation: String,
    /// 额外的细节信息，如路径、存储键
    pub detail: Option<String>,
}

// =========================================================
// 核心错误类型
// =========================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientError {
    pub kind: ClientErrorKind,
    pub message: String,
    spans: Vec<ErrorSpan>,
}

impl ClientError {
    pub fn new(kind: ClientErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            spans: Vec::new(),
        }
    }

    // --- Convenience constructors ---

    pub fn remote(status: u16, message: impl Into<String>) -> Self {
        Self::new(ClientErrorKind::Remote { status }, message)
    }

    pub fn unexpected_shape(message: impl Into<String>) -> Self {
        Self::new(ClientErrorKind::UnexpectedShape, message)
    }

    pub fn context_unavailable(context: &str) -> Self {
        Self::new(
            ClientErrorKind::ContextUnavailable,
            format!("{} 未在当前作用域中提供", context),
        )
    }

    pub fn storage_corrupt(message: impl Into<String>) -> Self {
        Self::new(ClientErrorKind::StorageCorrupt, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ClientErrorKind::Network, message)
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(ClientErrorKind::Serialization, message)
    }

    // --- Context builders ---

    /// 添加操作追踪（无额外细节）
    pub fn in_op(mut self, operation: impl Into<String>) -> Self {
        self.spans.push(ErrorSpan {
            operation: operation.into(),
            detail: None,
        });
        self
    }

    /// 添加操作追踪（带额外细节）
    pub fn in_op_with(mut self, operation: impl Into<String>, detail: impl Into<String>) -> Self {
        self.spans.push(ErrorSpan {
            operation: operation.into(),
            detail: Some(detail.into()),
        });
        self
    }

    // --- Accessors ---

    /// 远端错误的 HTTP 状态码
    pub fn status(&self) -> Option<u16> {
        match self.kind {
            ClientErrorKind::Remote { status } => Some(status),
            _ => None,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn spans(&self) -> &[ErrorSpan] {
        &self.spans
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.kind.error_code())?;
        if let Some(status) = self.status() {
            write!(f, "({})", status)?;
        }
        write!(f, " {}", self.message)?;

        if !self.spans.is_empty() {
            write!(f, " | trace: ")?;
            for (i, span) in self.spans.iter().enumerate() {
                if i > 0 {
                    write!(f, " -> ")?;
                }
                write!(f, "{}", span.operation)?;
                if let Some(detail) = &span.detail {
                    write!(f, "({})", detail)?;
                }
            }
        }
        Ok(())
    }
}

impl std::error::Error for ClientError {}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::serialization(e.to_string())
    }
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_status_and_trace() {
        let err = ClientError::remote(404, "not found")
            .in_op_with("gateway.get", "/api/listar_citas_consultorio")
            .in_op("api.list_appointments");

        assert_eq!(err.status(), Some(404));
        assert_eq!(err.message(), "not found");
        assert_eq!(
            err.to_string(),
            "[REMOTE_ERROR](404) not found | trace: gateway.get(/api/listar_citas_consultorio) -> api.list_appointments"
        );
    }

    #[test]
    fn non_remote_errors_have_no_status() {
        let err = ClientError::unexpected_shape("sin lista");
        assert_eq!(err.status(), None);
        assert_eq!(err.to_string(), "[UNEXPECTED_SHAPE] sin lista");
    }

    #[test]
    fn serde_errors_map_to_serialization() {
        let err: ClientError = serde_json::from_str::<u32>("x").unwrap_err().into();
        assert_eq!(err.kind, ClientErrorKind::Serialization);
    }
}
