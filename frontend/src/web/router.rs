//! 路由服务模块 - 核心引擎
//!
//! 封装了 web_sys 的 History API，实现高内聚：
//! 所有对 window.history 的操作都集中在此模块。
//! 实现了"监听 -> 验证 -> 处理 -> 加载"的导航流程。
//!
//! 守卫在每次导航（push、popstate、会话变化）时重新求值，从不缓存。

use consultorio_shared::Principal;
use leptos::ev::MouseEvent;
use leptos::prelude::*;
use wasm_bindgen::prelude::*;

use super::route::AppRoute;
use crate::error::{ClientError, ClientResult};
use crate::guard::resolve;

/// 获取当前浏览器路径
fn current_path() -> String {
    web_sys::window()
        .and_then(|w| w.location().pathname().ok())
        .unwrap_or_else(|| "/".to_string())
}

/// 写入 History 状态
///
/// `push` 为 false 时使用 replaceState（重定向与 popstate 不产生新的历史记录）。
fn write_history(path: &str, push: bool) {
    let Some(history) = web_sys::window().and_then(|w| w.history().ok()) else {
        return;
    };
    let result = if push {
        history.push_state_with_url(&JsValue::NULL, "", Some(path))
    } else {
        history.replace_state_with_url(&JsValue::NULL, "", Some(path))
    };
    if result.is_err() {
        log_warn!("[Router] 无法写入 History: {}", path);
    }
}

/// 路由器服务
///
/// 封装所有路由操作，通过 Signal 驱动界面更新。
/// 通过注入会话信号实现与认证系统的解耦。
#[derive(Clone, Copy)]
pub struct RouterService {
    current_route: ReadSignal<AppRoute>,
    set_route: WriteSignal<AppRoute>,
    /// 当前会话（注入的信号）
    session: Signal<Option<Principal>>,
}

impl RouterService {
    fn new(session: Signal<Option<Principal>>) -> Self {
        // 初始路由同样经过守卫
        let requested = AppRoute::from_path(&current_path());
        let initial = resolve(&requested, &session.get_untracked());
        if initial != requested {
            log_info!("[Router] 初始路由 {} 重定向到 {}", requested, initial);
            write_history(&initial.to_path(), false);
        }
        let (current_route, set_route) = signal(initial);

        Self {
            current_route,
            set_route,
            session,
        }
    }

    /// 获取当前路由信号
    pub fn current_route(&self) -> ReadSignal<AppRoute> {
        self.current_route
    }

    /// **核心方法：导航与守卫**
    ///
    /// 流程：请求 -> 验证(Guard) -> 处理 -> 加载
    pub fn navigate(&self, path: &str) {
        self.navigate_to(AppRoute::from_path(path));
    }

    pub fn navigate_to(&self, target: AppRoute) {
        Self::apply(self.set_route, self.session, target, true);
    }

    /// 对目标路由执行守卫并更新 History 与路由信号
    fn apply(
        set_route: WriteSignal<AppRoute>,
        session: Signal<Option<Principal>>,
        target: AppRoute,
        push: bool,
    ) {
        // --- Step 1: 验证目标路由 ---
        let resolved = resolve(&target, &session.get_untracked());
        let redirected = resolved != target;
        if redirected {
            log_info!("[Router] {} 被拒绝，重定向到 {}", target, resolved);
        }

        // --- Step 2: 加载页面 (更新状态) ---
        // popstate 时浏览器已更新地址栏，只有被重定向才需要改写
        if push || redirected {
            write_history(&resolved.to_path(), push);
        }
        set_route.set(resolved);
    }

    /// 初始化浏览器后退/前进按钮监听
    fn init_popstate_listener(&self) {
        let set_route = self.set_route;
        let session = self.session;

        let closure = Closure::<dyn Fn()>::new(move || {
            let target = AppRoute::from_path(&current_path());
            Self::apply(set_route, session, target, false);
        });

        if let Some(window) = web_sys::window() {
            let _ = window
                .add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref());
        }

        // 路由服务与页面同寿命，泄漏闭包以保持监听器存活
        closure.forget();
    }

    /// 会话变化（登录/注销）时重新对当前路由求值
    fn setup_session_redirect(&self) {
        let current_route = self.current_route;
        let set_route = self.set_route;
        let session = self.session;

        Effect::new(move |_| {
            let principal = session.get();
            let route = current_route.get_untracked();
            let resolved = resolve(&route, &principal);

            if resolved != route {
                log_info!("[Router] 会话变化，{} 重定向到 {}", route, resolved);
                write_history(&resolved.to_path(), true);
                set_route.set(resolved);
            }
        });
    }
}

/// 提供路由服务到 Context 并初始化
fn provide_router(session: Signal<Option<Principal>>) -> RouterService {
    let router = RouterService::new(session);

    router.init_popstate_listener();
    router.setup_session_redirect();

    provide_context(router);
    router
}

pub fn try_use_router() -> ClientResult<RouterService> {
    use_context::<RouterService>().ok_or_else(|| ClientError::context_unavailable("RouterService"))
}

/// 从 Context 获取路由服务
///
/// # Panics
/// 在 `Router` 之外调用时中止渲染。
pub fn use_router() -> RouterService {
    match try_use_router() {
        Ok(router) => router,
        Err(e) => panic!("{}", e),
    }
}

/// 导航函数（返回一个可调用的闭包）
pub fn use_navigate() -> impl Fn(AppRoute) + Clone + Copy {
    let router = use_router();
    move |to: AppRoute| router.navigate_to(to)
}

// ============================================================================
// UI 组件
// ============================================================================

/// 路由器根组件
///
/// 提供路由上下文，应在 App 根部使用。
#[component]
pub fn Router(
    /// 会话信号
    session: Signal<Option<Principal>>,
    children: Children,
) -> impl IntoView {
    provide_router(session);

    children()
}

/// 路由出口组件
///
/// 根据当前路由状态渲染对应的组件。
#[component]
pub fn RouterOutlet(
    /// 路由匹配函数：接收当前路由，返回对应视图
    matcher: fn(AppRoute) -> AnyView,
) -> impl IntoView {
    let router = use_router();

    move || matcher(router.current_route().get())
}

/// 站内链接：拦截点击并交给路由服务
#[component]
pub fn Link(
    to: AppRoute,
    #[prop(optional, into)] class: String,
    children: Children,
) -> impl IntoView {
    let router = use_router();
    let href = to.to_path();

    let on_click = move |ev: MouseEvent| {
        ev.prevent_default();
        router.navigate_to(to.clone());
    };

    view! {
        <a href=href class=class on:click=on_click>
            {children()}
        </a>
    }
}
