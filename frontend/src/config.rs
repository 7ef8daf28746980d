//! 应用配置
//!
//! 编译期通过环境变量覆盖，未设置时使用默认值：
//!
//! | 变量 | 字段 | 默认值 |
//! |---|---|---|
//! | `CONSULTORIO_API_BASE` | `api_base` | 空（同源，开发时由代理转发 `/api`） |
//! | `CONSULTORIO_CHATBOT_URL` | `chatbot_url` | `/api/chatbot` |
//! | `CONSULTORIO_REPORT_URL` | `report_url` | `/api/cerrar_conversacion` |
//! | `CONSULTORIO_REPORTS_URL` | `reports_url` | `/api/reportes` |

use leptos::prelude::*;

const DEFAULT_CHATBOT_PATH: &str = "/api/chatbot";
const DEFAULT_REPORT_PATH: &str = "/api/cerrar_conversacion";
const DEFAULT_REPORTS_PATH: &str = "/api/reportes";

/// 登录页模拟的网络延迟
const DEFAULT_LOGIN_DELAY_MS: u32 = 600;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// 后端 API 根地址，末尾不带 `/`
    pub api_base: String,
    /// 聊天机器人对话接口
    pub chatbot_url: String,
    /// 对话结束上报接口
    pub report_url: String,
    /// 对话报告列表接口
    pub reports_url: String,
    pub login_delay_ms: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: String::new(),
            chatbot_url: DEFAULT_CHATBOT_PATH.to_string(),
            report_url: DEFAULT_REPORT_PATH.to_string(),
            reports_url: DEFAULT_REPORTS_PATH.to_string(),
            login_delay_ms: DEFAULT_LOGIN_DELAY_MS,
        }
    }
}

impl AppConfig {
    /// 读取编译期环境变量
    pub fn from_build_env() -> Self {
        Self::with_overrides(
            option_env!("CONSULTORIO_API_BASE"),
            option_env!("CONSULTORIO_CHATBOT_URL"),
            option_env!("CONSULTORIO_REPORT_URL"),
            option_env!("CONSULTORIO_REPORTS_URL"),
        )
    }

    fn with_overrides(
        api_base: Option<&str>,
        chatbot_url: Option<&str>,
        report_url: Option<&str>,
        reports_url: Option<&str>,
    ) -> Self {
        let pick = |value: Option<&str>, fallback: String| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .unwrap_or(fallback)
        };

        let defaults = Self::default();
        Self {
            api_base: pick(api_base, defaults.api_base)
                .trim_end_matches('/')
                .to_string(),
            chatbot_url: pick(chatbot_url, defaults.chatbot_url),
            report_url: pick(report_url, defaults.report_url),
            reports_url: pick(reports_url, defaults.reports_url),
            login_delay_ms: defaults.login_delay_ms,
        }
    }
}

pub fn provide_config() -> AppConfig {
    let config = AppConfig::from_build_env();
    log_info!("[Config] API: '{}'", config.api_base);
    provide_context(config.clone());
    config
}

/// 未提供时退回默认配置
pub fn use_config() -> AppConfig {
    use_context::<AppConfig>().unwrap_or_default()
}
