//! 路由守卫
//!
//! 守卫是会话状态上的无副作用谓词：每次导航都重新求值，从不缓存，
//! 也从不修改会话。未登录与无权限重定向到同一目标，不泄露角色信息。

use consultorio_shared::Principal;

use crate::auth::{SessionView, default_route_for};
use crate::web::route::AppRoute;

/// 守卫的判定结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Render,
    Redirect(AppRoute),
}

/// 包裹受保护视图，决定放行还是重定向
pub trait Guard {
    fn check(&self, session: &dyn SessionView) -> GuardDecision;
}

/// 需要已登录会话
#[derive(Debug, Clone, Copy, Default)]
pub struct RequiresSession;

impl Guard for RequiresSession {
    fn check(&self, session: &dyn SessionView) -> GuardDecision {
        if session.is_authenticated() {
            GuardDecision::Render
        } else {
            GuardDecision::Redirect(AppRoute::auth_failure_redirect())
        }
    }
}

/// 需要管理员会话
#[derive(Debug, Clone, Copy, Default)]
pub struct RequiresAdmin;

impl Guard for RequiresAdmin {
    fn check(&self, session: &dyn SessionView) -> GuardDecision {
        if !session.is_authenticated() || !session.is_admin() {
            return GuardDecision::Redirect(AppRoute::auth_failure_redirect());
        }
        GuardDecision::Render
    }
}

/// 计算导航到 `target` 时实际应展示的路由
///
/// 1. 目标路由的守卫拒绝 → 守卫给出的重定向目标
/// 2. 已登录用户访问登录页 → 该用户的默认落地页
/// 3. 其他情况 → 目标本身
pub fn resolve(target: &AppRoute, session: &dyn SessionView) -> AppRoute {
    if let Some(guard) = target.guard() {
        if let GuardDecision::Redirect(to) = guard.check(session) {
            return to;
        }
    }

    if target.should_redirect_when_authenticated() {
        if let Some(principal) = session.current_principal() {
            return default_route_for(&principal);
        }
    }

    target.clone()
}

/// 便于测试与非响应式场景：直接以可选的 `Principal` 作为会话视图
impl SessionView for Option<Principal> {
    fn current_principal(&self) -> Option<Principal> {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> Option<Principal> {
        Some(Principal::new("u2", "Luis"))
    }

    fn admin() -> Option<Principal> {
        Some(Principal::new("u1", "psicologa"))
    }

    #[test]
    fn requires_session_decisions() {
        assert_eq!(
            RequiresSession.check(&None::<Principal>),
            GuardDecision::Redirect(AppRoute::Landing)
        );
        assert_eq!(RequiresSession.check(&user()), GuardDecision::Render);
        assert_eq!(RequiresSession.check(&admin()), GuardDecision::Render);
    }

    #[test]
    fn requires_admin_hides_role_behind_same_redirect() {
        let anonymous = RequiresAdmin.check(&None::<Principal>);
        let forbidden = RequiresAdmin.check(&user());
        assert_eq!(anonymous, GuardDecision::Redirect(AppRoute::Landing));
        assert_eq!(forbidden, anonymous);
        assert_eq!(RequiresAdmin.check(&admin()), GuardDecision::Render);
    }

    #[test]
    fn admin_flag_alone_passes() {
        let flagged = Some(Principal::new("u3", "Marta").with_admin_flag(true));
        assert_eq!(RequiresAdmin.check(&flagged), GuardDecision::Render);
    }

    #[test]
    fn resolve_applies_route_guards() {
        assert_eq!(resolve(&AppRoute::Chat, &None::<Principal>), AppRoute::Landing);
        assert_eq!(resolve(&AppRoute::Chat, &user()), AppRoute::Chat);
        assert_eq!(resolve(&AppRoute::AdminStats, &user()), AppRoute::Landing);
        assert_eq!(
            resolve(&AppRoute::AdminPatientDetail("p1".into()), &admin()),
            AppRoute::AdminPatientDetail("p1".into())
        );
    }

    #[test]
    fn resolve_moves_authenticated_users_off_login() {
        assert_eq!(resolve(&AppRoute::Login, &None::<Principal>), AppRoute::Login);
        assert_eq!(resolve(&AppRoute::Login, &user()), AppRoute::Chat);
        assert_eq!(resolve(&AppRoute::Login, &admin()), AppRoute::Admin);
    }

    #[test]
    fn public_routes_always_render() {
        for route in [AppRoute::Landing, AppRoute::Register, AppRoute::NotFound] {
            assert_eq!(resolve(&route, &None::<Principal>), route);
        }
    }
}
