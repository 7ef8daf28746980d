//! 路由定义模块 - 领域模型
//!
//! 纯粹的业务逻辑层，不依赖于 DOM 或 web_sys。
//! 定义了应用的所有路由及其守卫。

use std::fmt::Display;

use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};

use crate::guard::{Guard, RequiresAdmin, RequiresSession};

/// 路径段中需要转义的字符
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// 应用路由枚举
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AppRoute {
    /// 公共首页（未认证/无权限时的重定向目标）
    #[default]
    Landing,
    Login,
    Register,
    /// 聊天机器人 (需要会话)
    Chat,
    /// 患者预约 (需要会话)
    Schedule,
    /// 管理端首页：预约管理 (需要管理员)
    Admin,
    AdminPatients,
    AdminPatientDetail(String),
    AdminStats,
    /// 页面未找到
    NotFound,
}

impl AppRoute {
    /// 将 URL path 解析为路由枚举
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or("/");
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => Self::Landing,
            "/login" => Self::Login,
            "/registro" => Self::Register,
            "/chat" => Self::Chat,
            "/agendar" => Self::Schedule,
            "/admin" => Self::Admin,
            "/admin/pacientes" => Self::AdminPatients,
            "/admin/estadisticas" => Self::AdminStats,
            other => match other.strip_prefix("/admin/pacientes/") {
                Some(raw) if !raw.is_empty() && !raw.contains('/') => {
                    match percent_decode_str(raw).decode_utf8() {
                        Ok(id) => Self::AdminPatientDetail(id.into_owned()),
                        Err(_) => Self::NotFound,
                    }
                }
                _ => Self::NotFound,
            },
        }
    }

    /// 获取路由对应的 URL path
    pub fn to_path(&self) -> String {
        match self {
            Self::Landing => "/".to_string(),
            Self::Login => "/login".to_string(),
            Self::Register => "/registro".to_string(),
            Self::Chat => "/chat".to_string(),
            Self::Schedule => "/agendar".to_string(),
            Self::Admin => "/admin".to_string(),
            Self::AdminPatients => "/admin/pacientes".to_string(),
            Self::AdminPatientDetail(id) => {
                format!("/admin/pacientes/{}", utf8_percent_encode(id, PATH_SEGMENT))
            }
            Self::AdminStats => "/admin/estadisticas".to_string(),
            Self::NotFound => "/404".to_string(),
        }
    }

    /// **核心守卫声明：该路由由哪个守卫保护**
    pub fn guard(&self) -> Option<&'static dyn Guard> {
        match self {
            Self::Chat | Self::Schedule => Some(&RequiresSession),
            Self::Admin | Self::AdminPatients | Self::AdminPatientDetail(_) | Self::AdminStats => {
                Some(&RequiresAdmin)
            }
            Self::Landing | Self::Login | Self::Register | Self::NotFound => None,
        }
    }

    /// 已认证用户是否应该离开此路由
    pub fn should_redirect_when_authenticated(&self) -> bool {
        matches!(self, Self::Login)
    }

    /// 守卫拒绝时的重定向目标（未登录与无权限使用同一目标）
    pub fn auth_failure_redirect() -> Self {
        Self::Landing
    }
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_round_trip() {
        let routes = [
            AppRoute::Landing,
            AppRoute::Login,
            AppRoute::Register,
            AppRoute::Chat,
            AppRoute::Schedule,
            AppRoute::Admin,
            AppRoute::AdminPatients,
            AppRoute::AdminPatientDetail("p-7".into()),
            AppRoute::AdminStats,
        ];
        for route in routes {
            assert_eq!(AppRoute::from_path(&route.to_path()), route);
        }
    }

    #[test]
    fn patient_ids_are_percent_encoded() {
        let route = AppRoute::AdminPatientDetail("María José".into());
        assert_eq!(route.to_path(), "/admin/pacientes/Mar%C3%ADa%20Jos%C3%A9");
        assert_eq!(AppRoute::from_path(&route.to_path()), route);

        let slashed = AppRoute::AdminPatientDetail("a/b?c".into());
        assert_eq!(AppRoute::from_path(&slashed.to_path()), slashed);
    }

    #[test]
    fn undecodable_patient_id_is_not_found() {
        assert_eq!(AppRoute::from_path("/admin/pacientes/%FF"), AppRoute::NotFound);
    }

    #[test]
    fn tolerates_trailing_slash_and_query() {
        assert_eq!(AppRoute::from_path("/admin/"), AppRoute::Admin);
        assert_eq!(AppRoute::from_path("/chat?x=1"), AppRoute::Chat);
        assert_eq!(AppRoute::from_path(""), AppRoute::Landing);
    }

    #[test]
    fn unknown_paths_are_not_found() {
        assert_eq!(AppRoute::from_path("/admin/pacientes/a/b"), AppRoute::NotFound);
        assert_eq!(AppRoute::from_path("/nada"), AppRoute::NotFound);
    }

    #[test]
    fn only_private_routes_have_guards() {
        assert!(AppRoute::Landing.guard().is_none());
        assert!(AppRoute::Login.guard().is_none());
        assert!(AppRoute::Chat.guard().is_some());
        assert!(AppRoute::AdminStats.guard().is_some());
    }
}
