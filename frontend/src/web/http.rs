//! HTTP 请求封装模块
//!
//! 使用 `web_sys::fetch` 实现网关的 `Transport`，
//! 另外提供两种"发出即忘"的投递方式：`sendBeacon` 与 keep-alive fetch。

use async_trait::async_trait;
use consultorio_shared::protocol::HttpMethod;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, Response};

use crate::error::{ClientError, ClientResult};
use crate::gateway::{HttpRequest, HttpResponse, Transport};

#[wasm_bindgen]
extern "C" {
    /// `RequestInit` 的 `keepalive` 字段，web-sys 未生成对应 setter
    type KeepAliveInit;

    #[wasm_bindgen(method, setter = keepalive)]
    fn set_keepalive(this: &KeepAliveInit, value: bool);
}

fn method_str(method: HttpMethod) -> &'static str {
    match method {
        HttpMethod::Get => "GET",
        HttpMethod::Post => "POST",
    }
}

/// HTTP 请求构建器
pub struct HttpRequestBuilder {
    url: String,
    method: HttpMethod,
    headers: Vec<(String, String)>,
    body: Option<String>,
    keepalive: bool,
}

impl HttpRequestBuilder {
    fn new(url: String, method: HttpMethod) -> Self {
        Self {
            url,
            method,
            headers: Vec::new(),
            body: None,
            keepalive: false,
        }
    }

    /// 添加请求头
    pub fn header(mut self, key: &str, value: &str) -> Self {
        self.headers.push((key.to_string(), value.to_string()));
        self
    }

    /// 设置请求体
    pub fn body(mut self, body: String) -> Self {
        self.body = Some(body);
        self
    }

    /// 允许请求在页面/组件销毁后继续完成
    pub fn keepalive(mut self, keepalive: bool) -> Self {
        self.keepalive = keepalive;
        self
    }

    /// 发送请求
    pub async fn send(self) -> ClientResult<HttpResponse> {
        let headers = Headers::new()
            .map_err(|e| ClientError::network(format!("创建 Headers 失败: {:?}", e)))?;

        for (key, value) in &self.headers {
            headers
                .set(key, value)
                .map_err(|e| ClientError::network(format!("设置 Header 失败: {:?}", e)))?;
        }

        let opts = RequestInit::new();
        opts.set_method(method_str(self.method));
        opts.set_headers(&headers.into());
        if self.keepalive {
            opts.unchecked_ref::<KeepAliveInit>().set_keepalive(true);
        }

        if let Some(body) = &self.body {
            opts.set_body(&JsValue::from_str(body));
        }

        let request = Request::new_with_str_and_init(&self.url, &opts)
            .map_err(|e| ClientError::network(format!("请求构建失败: {:?}", e)))?;

        let window =
            web_sys::window().ok_or_else(|| ClientError::network("无法获取 window 对象"))?;

        let resp_value = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(|e| ClientError::network(format!("{:?}", e)))?;

        let response: Response = resp_value
            .dyn_into()
            .map_err(|e| ClientError::network(format!("Response 类型转换失败: {:?}", e)))?;

        let content_type = response.headers().get("content-type").ok().flatten();
        let status = response.status();

        let promise = response
            .text()
            .map_err(|e| ClientError::network(format!("读取响应体失败: {:?}", e)))?;
        let text = JsFuture::from(promise)
            .await
            .map_err(|e| ClientError::network(format!("读取响应体失败: {:?}", e)))?;

        Ok(HttpResponse {
            status,
            content_type,
            body: text.as_string().unwrap_or_default(),
        })
    }
}

/// 轻量级 HTTP 客户端
pub struct HttpClient;

impl HttpClient {
    pub fn post(url: &str) -> HttpRequestBuilder {
        HttpRequestBuilder::new(url.to_string(), HttpMethod::Post)
    }
}

// =========================================================
// 实现层: 浏览器 fetch (Production)
// =========================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct FetchTransport;

#[async_trait(?Send)]
impl Transport for FetchTransport {
    async fn send(&self, req: HttpRequest) -> ClientResult<HttpResponse> {
        let mut builder = HttpRequestBuilder::new(req.url, req.method);
        for (k, v) in &req.headers {
            builder = builder.header(k, v);
        }
        if let Some(body) = req.body {
            builder = builder.body(body);
        }
        builder.send().await
    }
}

// =========================================================
// 发出即忘 (Fire and forget)
// =========================================================

/// 通过 `navigator.sendBeacon` 投递，不阻塞页面卸载
///
/// 返回浏览器是否接受了投递请求；接受不代表送达。
pub fn send_beacon(url: &str, body: &str) -> bool {
    web_sys::window()
        .and_then(|w| w.navigator().send_beacon_with_opt_str(url, Some(body)).ok())
        .unwrap_or(false)
}

/// 以 keep-alive fetch 投递 JSON，调用方不等待结果
///
/// 失败只记录日志。
pub fn post_keepalive(url: &str, body: String) {
    let builder = HttpClient::post(url)
        .header("Content-Type", "application/json")
        .body(body)
        .keepalive(true);
    let url = url.to_string();
    leptos::task::spawn_local(async move {
        match builder.send().await {
            Ok(resp) if (200..300).contains(&resp.status) => {}
            Ok(resp) => log_warn!("[Http] keep-alive 投递 {} 返回 {}", url, resp.status),
            Err(e) => log_warn!("[Http] keep-alive 投递 {} 失败: {}", url, e),
        }
    });
}
