//! 页面内的提示框与加载指示

use leptos::prelude::*;

use crate::error::ClientError;

/// 提示内容：文本 + 是否为错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub text: String,
    pub is_error: bool,
}

impl Flash {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }

    /// 界面只展示后端给出的消息，完整的调用链写入控制台
    pub fn from_error(context: &str, err: &ClientError) -> Self {
        log_error!("[Page] {}: {}", context, err);
        Self::error(format!("{}: {}", context, err.message()))
    }
}

/// 可关闭的提示框
#[component]
pub fn Notice(flash: RwSignal<Option<Flash>>) -> impl IntoView {
    view! {
        <Show when=move || flash.with(Option::is_some)>
            <div
                role="alert"
                class=move || {
                    if flash.with(|f| f.as_ref().is_some_and(|f| f.is_error)) {
                        "alert alert-error text-sm py-2"
                    } else {
                        "alert alert-success text-sm py-2"
                    }
                }
            >
                <span>{move || flash.with(|f| f.as_ref().map(|f| f.text.clone()).unwrap_or_default())}</span>
                <button class="btn btn-ghost btn-xs" on:click=move |_| flash.set(None)>
                    "✕"
                </button>
            </div>
        </Show>
    }
}

#[component]
pub fn Spinner(#[prop(optional, into)] label: Option<String>) -> impl IntoView {
    view! {
        <div class="flex items-center justify-center gap-2 py-8 text-base-content/60">
            <span class="loading loading-spinner loading-md"></span>
            {label}
        </div>
    }
}

/// 浏览器确认框；无法弹出时视为取消
pub fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|w| w.confirm_with_message(message).ok())
        .unwrap_or(false)
}
