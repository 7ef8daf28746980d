//! 后端网关
//!
//! 对远端 HTTP API 的统一封装：
//! - 只提供 GET / POST，始终发送 JSON
//! - 响应声明为 JSON 时按 JSON 解析，否则退回原始文本
//! - 非 2xx 统一转换为 `Remote` 错误，并尽力提取可读的错误消息
//! - 不自动重试，不设内部超时
//!
//! 网络层通过 `Transport` 抽象，生产环境使用 `web::http::FetchTransport`。

mod envelope;
#[cfg(test)]
mod tests;

pub use envelope::ListEnvelope;

use async_trait::async_trait;
use consultorio_shared::protocol::{ApiRequest, HttpMethod, ListRequest};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::error::{ClientError, ClientResult};

// =========================================================
// 核心抽象层 (HTTP Interface Abstraction)
// =========================================================

/// 通用 HTTP 请求结构
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(url: &str, method: HttpMethod) -> Self {
        Self {
            url: url.to_string(),
            method,
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.push((key.to_string(), value.to_string()));
        self
    }

    pub fn with_body(mut self, body: String) -> Self {
        self.body = Some(body);
        self
    }
}

/// 通用 HTTP 响应结构
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    fn declares_json(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("json"))
    }
}

/// HTTP 传输层特性
/// (?Send) 是因为浏览器环境下的 Future 不是 Send 的
#[async_trait(?Send)]
pub trait Transport {
    async fn send(&self, req: HttpRequest) -> ClientResult<HttpResponse>;
}

// =========================================================
// 响应体
// =========================================================

/// 解码后的响应体
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    Text(String),
}

impl Payload {
    /// 按 Content-Type 解码；声明为 JSON 但解析失败时退回文本
    pub fn decode(response: &HttpResponse) -> Self {
        if response.declares_json() {
            if let Ok(value) = serde_json::from_str(&response.body) {
                return Payload::Json(value);
            }
        }
        Payload::Text(response.body.clone())
    }

    /// 转换为 JSON 值；文本体视为 JSON 字符串
    pub fn into_json(self) -> Value {
        match self {
            Payload::Json(v) => v,
            Payload::Text(t) => Value::String(t),
        }
    }

    /// 反序列化为目标类型
    ///
    /// 文本体先尝试按 JSON 解析（部分接口不设置 Content-Type），
    /// 仍失败则当作 JSON 字符串交给目标类型处理。
    pub fn into_typed<T: DeserializeOwned>(self) -> ClientResult<T> {
        let value = match self {
            Payload::Json(v) => v,
            Payload::Text(t) => serde_json::from_str(&t).unwrap_or(Value::String(t)),
        };
        serde_json::from_value(value).map_err(ClientError::from)
    }
}

/// 从失败响应中提取错误消息
///
/// 优先级：JSON 的 `error` 字段 → `message` 字段 → 整个 JSON → 原始文本 → `HTTP <status>`
pub fn error_message(payload: &Payload, status: u16) -> String {
    match payload {
        Payload::Json(value) => {
            for field in ["error", "message"] {
                match value.get(field) {
                    Some(Value::String(s)) if !s.is_empty() => return s.clone(),
                    Some(Value::String(_)) | Some(Value::Null) | None => {}
                    Some(other) => return other.to_string(),
                }
            }
            value.to_string()
        }
        Payload::Text(text) if !text.trim().is_empty() => text.clone(),
        Payload::Text(_) => format!("HTTP {}", status),
    }
}

/// 将原始响应转换为成功载荷或 `Remote` 错误
pub fn interpret(response: HttpResponse) -> ClientResult<Payload> {
    let payload = Payload::decode(&response);
    if response.is_success() {
        Ok(payload)
    } else {
        Err(ClientError::remote(
            response.status,
            error_message(&payload, response.status),
        ))
    }
}

// =========================================================
// 网关
// =========================================================

#[derive(Debug, Clone)]
pub struct Gateway<T> {
    base_url: String,
    transport: T,
}

impl<T: Transport> Gateway<T> {
    pub fn new(base_url: impl Into<String>, transport: T) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            transport,
        }
    }

    /// 绝对地址原样使用，相对路径拼接到 base_url
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    async fn execute(&self, req: HttpRequest, op: &'static str, path: &str) -> ClientResult<Payload> {
        let response = self
            .transport
            .send(req)
            .await
            .map_err(|e| e.in_op_with(op, path))?;
        interpret(response).map_err(|e| e.in_op_with(op, path))
    }

    pub async fn get(&self, path: &str) -> ClientResult<Payload> {
        let req = HttpRequest::new(&self.url(path), HttpMethod::Get)
            .with_header("Accept", "application/json");
        self.execute(req, "gateway.get", path).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ClientResult<Payload> {
        let body = serde_json::to_string(body)
            .map_err(|e| ClientError::from(e).in_op_with("gateway.post", path))?;
        let req = HttpRequest::new(&self.url(path), HttpMethod::Post)
            .with_header("Accept", "application/json")
            .with_header("Content-Type", "application/json")
            .with_body(body);
        self.execute(req, "gateway.post", path).await
    }

    /// 调用具名接口并解码为其响应类型
    pub async fn call<R: ApiRequest>(&self, request: &R) -> ClientResult<R::Response> {
        let payload = match R::METHOD {
            HttpMethod::Get => self.get(R::PATH).await?,
            HttpMethod::Post => self.post(R::PATH, request).await?,
        };
        payload
            .into_typed()
            .map_err(|e| e.in_op_with("gateway.call", R::PATH))
    }

    /// 调用列表接口，按固定优先级识别响应包装结构
    pub async fn list<R: ListRequest>(&self, _request: &R) -> ClientResult<Vec<R::Item>> {
        self.list_at(R::PATH, R::WRAPPER_KEYS).await
    }

    /// 对任意地址执行 GET 并识别列表包装结构
    pub async fn list_at<I: DeserializeOwned>(
        &self,
        path: &str,
        wrapper_keys: &[&str],
    ) -> ClientResult<Vec<I>> {
        let payload = self.get(path).await?;
        ListEnvelope::detect(payload.into_json(), wrapper_keys)
            .and_then(|envelope| envelope.into_items())
            .map_err(|e| e.in_op_with("gateway.list", path))
    }
}
