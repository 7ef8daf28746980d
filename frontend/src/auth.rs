//! 认证模块
//!
//! 管理当前会话主体，与路由系统解耦：
//! 守卫与页面只依赖 `SessionView` 能力接口，路由服务通过注入的信号感知会话变化。

use consultorio_shared::{Principal, is_admin};
use leptos::prelude::*;

use crate::error::{ClientError, ClientResult};
use crate::session::SessionStore;
use crate::web::route::AppRoute;
use crate::web::storage::{BrowserStorage, KeyValueStore};

/// 会话的只读能力
///
/// 管理员标记在每次读取时由 `Principal` 重新推导。
pub trait SessionView {
    fn current_principal(&self) -> Option<Principal>;

    fn is_authenticated(&self) -> bool {
        self.current_principal().is_some()
    }

    fn is_admin(&self) -> bool {
        self.current_principal().as_ref().is_some_and(is_admin)
    }
}

/// 登录后的默认落地页（纯函数）
pub fn default_route_for(principal: &Principal) -> AppRoute {
    if is_admin(principal) {
        AppRoute::Admin
    } else {
        AppRoute::Chat
    }
}

/// 认证上下文
///
/// 内存中的 `Principal` 保存在信号里，持久化委托给 `SessionStore`。
#[derive(Clone, Copy)]
pub struct AuthContext<S = BrowserStorage> {
    principal: RwSignal<Option<Principal>>,
    store: SessionStore<S>,
}

impl<S: KeyValueStore> AuthContext<S> {
    /// 创建上下文，并从本地存储恢复一次会话
    pub fn hydrate(store: S) -> Self {
        let store = SessionStore::new(store);
        let restored = store.load();
        if let Some(p) = &restored {
            log_info!("[Auth] 恢复会话: {}", p.identifier);
        }
        Self {
            principal: RwSignal::new(restored),
            store,
        }
    }

    /// 设置当前主体并持久化
    ///
    /// 不校验凭据，凭据校验属于后端职责。
    pub fn login(&self, principal: Principal) {
        log_info!("[Auth] 登录: {}", principal.identifier);
        self.store.save(&principal);
        self.principal.set(Some(principal));
    }

    /// 清除当前主体及其持久化副本
    ///
    /// 导航由路由服务监听会话信号自动处理。
    pub fn logout(&self) {
        log_info!("[Auth] 注销");
        self.principal.set(None);
        self.store.clear();
    }

    /// 会话信号（用于路由服务注入与响应式渲染）
    pub fn principal_signal(&self) -> Signal<Option<Principal>> {
        self.principal.into()
    }
}

impl<S> SessionView for AuthContext<S> {
    fn current_principal(&self) -> Option<Principal> {
        self.principal.get_untracked()
    }
}

/// 创建认证上下文并提供到 Context
pub fn provide_auth() -> AuthContext {
    let ctx = AuthContext::hydrate(BrowserStorage);
    provide_context(ctx);
    ctx
}

/// 从 Context 获取认证上下文
pub fn try_use_auth() -> ClientResult<AuthContext> {
    use_context::<AuthContext>().ok_or_else(|| ClientError::context_unavailable("AuthContext"))
}

/// 从 Context 获取认证上下文
///
/// # Panics
/// 在 Provider 作用域之外调用属于编程错误，直接中止渲染。
pub fn use_auth() -> AuthContext {
    match try_use_auth() {
        Ok(ctx) => ctx,
        Err(e) => panic!("{}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientErrorKind;
    use crate::guard::resolve;
    use crate::web::storage::MemoryStore;
    use consultorio_shared::KEY_SESSION;

    #[test]
    fn hydrate_reads_storage_exactly_once() {
        let backing = MemoryStore::new();
        SessionStore::new(backing.clone()).save(&Principal::new("u1", "Ana"));

        let ctx = AuthContext::hydrate(backing.clone());
        assert_eq!(backing.reads(), 1);

        assert!(ctx.is_authenticated());
        assert!(!ctx.is_admin());
        assert_eq!(ctx.current_principal().unwrap().identifier, "u1");
        assert_eq!(backing.reads(), 1);
    }

    #[test]
    fn login_survives_reload() {
        let backing = MemoryStore::new();
        let p = Principal::new("u7", "Marta").with_admin_flag(true);

        AuthContext::hydrate(backing.clone()).login(p.clone());

        let reloaded = AuthContext::hydrate(backing);
        assert_eq!(reloaded.current_principal(), Some(p));
        assert!(reloaded.is_admin());
    }

    #[test]
    fn logout_clears_memory_and_storage() {
        let backing = MemoryStore::new();
        let ctx = AuthContext::hydrate(backing.clone());
        ctx.login(Principal::new("u1", "Ana"));
        ctx.logout();

        assert!(!ctx.is_authenticated());
        assert!(!backing.contains(KEY_SESSION));
        assert!(!AuthContext::hydrate(backing).is_authenticated());
    }

    #[test]
    fn corrupt_session_hydrates_as_anonymous() {
        let backing = MemoryStore::new();
        backing.set(KEY_SESSION, "not-json");

        let ctx = AuthContext::hydrate(backing.clone());
        assert!(!ctx.is_authenticated());
        assert!(!backing.contains(KEY_SESSION));
    }

    #[test]
    fn default_route_follows_derived_role() {
        assert_eq!(
            default_route_for(&Principal::new("a", "PsicoLoga")),
            AppRoute::Admin
        );
        assert_eq!(
            default_route_for(&Principal::new("b", "Ana").with_admin_flag(true)),
            AppRoute::Admin
        );
        assert_eq!(default_route_for(&Principal::new("c", "Ana")), AppRoute::Chat);
    }

    #[test]
    fn context_outside_provider_is_unavailable() {
        let err = try_use_auth().err().unwrap();
        assert_eq!(err.kind, ClientErrorKind::ContextUnavailable);
    }

    #[test]
    #[should_panic(expected = "CONTEXT_UNAVAILABLE")]
    fn use_auth_outside_provider_panics() {
        let _ = use_auth();
    }

    #[test]
    fn admin_login_logout_navigation_scenario() {
        let ctx = AuthContext::hydrate(MemoryStore::new());
        let principal = Principal::new("u1", "psicologa");

        ctx.login(principal.clone());
        assert_eq!(default_route_for(&principal), AppRoute::Admin);
        assert_eq!(resolve(&AppRoute::Admin, &ctx), AppRoute::Admin);

        ctx.logout();
        assert_eq!(resolve(&AppRoute::Admin, &ctx), AppRoute::Landing);
    }
}
