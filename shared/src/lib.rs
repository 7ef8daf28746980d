//! 前后端共享的领域模型
//!
//! - 会话主体 `Principal` 及其管理员判定规则
//! - 聊天记录与画像事实
//! - 本地存储键名
//! - 业务记录（`records`）与接口目录（`protocol`）

use serde::{Deserialize, Serialize};

pub mod date;
pub mod protocol;
pub mod records;

pub use chrono;
pub use date::Timestamp;
pub use records::*;

// =========================================================
// 常量定义 (Constants)
// =========================================================

/// 保留的管理员显示名（大小写不敏感）
pub const ADMIN_DISPLAY_NAME: &str = "psicologa";

/// 所有本地存储键的命名空间前缀。
/// 数据结构变更时需要整体提升该前缀，没有迁移机制。
pub const STORAGE_NAMESPACE: &str = "consultorio.";
pub const KEY_SESSION: &str = "consultorio.session";
pub const KEY_THEME: &str = "consultorio.theme";
pub const PREFIX_CHAT_HISTORY: &str = "consultorio.chat.history.";
pub const PREFIX_CHAT_PROFILE: &str = "consultorio.chat.profile.";

/// 单个用户保留的最大聊天消息数
pub const MAX_CHAT_HISTORY: usize = 200;

pub fn chat_history_key(user_id: &str) -> String {
    format!("{}{}", PREFIX_CHAT_HISTORY, user_id)
}

pub fn chat_profile_key(user_id: &str) -> String {
    format!("{}{}", PREFIX_CHAT_PROFILE, user_id)
}

// =========================================================
// 会话主体 (Principal)
// =========================================================

/// 已认证的用户记录
///
/// 本地存储中的会话以此结构原样序列化。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub identifier: String,
    pub display_name: String,
    #[serde(default)]
    pub is_admin_flag: bool,
}

impl Principal {
    pub fn new(identifier: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            display_name: display_name.into(),
            is_admin_flag: false,
        }
    }

    pub fn with_admin_flag(mut self, flag: bool) -> Self {
        self.is_admin_flag = flag;
        self
    }

    /// 见 [`is_admin`]
    #[inline]
    pub fn is_admin(&self) -> bool {
        is_admin(self)
    }
}

/// 管理员判定：显式标记为真，或显示名等于保留名（忽略大小写）。
///
/// 每次读取都重新计算，不缓存结果。
pub fn is_admin(principal: &Principal) -> bool {
    principal.is_admin_flag
        || principal.display_name.to_lowercase() == ADMIN_DISPLAY_NAME
}

// =========================================================
// 聊天模型 (Chat)
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatSender {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: ChatSender,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: ChatSender::User,
            text: text.into(),
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            sender: ChatSender::Bot,
            text: text.into(),
        }
    }
}

/// 从对话中提取的用户画像
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProfileFacts {
    #[serde(rename = "nombre", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "edad", default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default)]
    pub updated_at: Timestamp,
}

impl ProfileFacts {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.age.is_none()
    }
}

/// 结束对话时上报给后端的数据
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationReport {
    pub user_id: String,
}

/// 一轮聊天请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurnRequest {
    pub user_id: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<ProfileFacts>,
}

/// 聊天机器人的回复
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurnReply {
    #[serde(alias = "reply", alias = "respuesta")]
    pub response: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_by_flag_or_reserved_name() {
        let cases = [
            ("ana", false, false),
            ("ana", true, true),
            ("psicologa", false, true),
            ("Psicologa", false, true),
            ("PSICOLOGA", true, true),
            ("psicóloga", false, false),
            ("psicologa2", false, false),
            (" psicologa", false, false),
            ("", false, false),
        ];

        for (name, flag, expected) in cases {
            let p = Principal::new("u1", name).with_admin_flag(flag);
            assert_eq!(is_admin(&p), expected, "name={:?} flag={}", name, flag);
            assert_eq!(p.is_admin(), expected);
        }
    }

    #[test]
    fn principal_uses_camel_case_keys() {
        let p = Principal::new("u1", "Ana").with_admin_flag(true);
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "identifier": "u1", "displayName": "Ana", "isAdminFlag": true })
        );
    }

    #[test]
    fn missing_admin_flag_defaults_to_false() {
        let p: Principal =
            serde_json::from_str(r#"{"identifier":"u1","displayName":"Ana"}"#).unwrap();
        assert!(!p.is_admin_flag);
    }

    #[test]
    fn profile_facts_use_spanish_keys() {
        let facts = ProfileFacts {
            name: Some("Ana".into()),
            age: Some(30),
            updated_at: Timestamp::new(5),
        };
        let json = serde_json::to_value(&facts).unwrap();
        assert_eq!(json["nombre"], "Ana");
        assert_eq!(json["edad"], 30);
        assert_eq!(json["updated_at"], 5);
    }

    #[test]
    fn chat_reply_accepts_known_aliases() {
        for body in [
            r#"{"response":"hola"}"#,
            r#"{"reply":"hola"}"#,
            r#"{"respuesta":"hola"}"#,
        ] {
            let reply: ChatTurnReply = serde_json::from_str(body).unwrap();
            assert_eq!(reply.response, "hola");
        }
    }

    #[test]
    fn chat_keys_are_namespaced() {
        assert_eq!(chat_history_key("u1"), "consultorio.chat.history.u1");
        assert_eq!(chat_profile_key("u1"), "consultorio.chat.profile.u1");
        assert!(KEY_SESSION.starts_with(STORAGE_NAMESPACE));
    }
}
