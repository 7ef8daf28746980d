//! Consultorio 前端应用
//!
//! 采用 Context-Driven 的高内聚低耦合架构：
//! - `web::route`: 路由定义（领域模型）
//! - `web::router`: 路由服务（核心引擎）
//! - `guard`: 路由守卫
//! - `auth` / `session`: 认证状态与本地会话
//! - `gateway` / `api`: 后端网关与业务接口
//! - `chat`: 聊天会话缓存
//! - `components`: UI 组件层

#[macro_use]
mod logging;

mod api;
mod auth;
mod chat;
mod config;
mod error;
mod gateway;
mod guard;
mod session;
mod theme;

mod components {
    pub mod admin;
    pub mod appointment_form;
    pub mod chat;
    pub mod landing;
    pub mod login;
    pub mod navbar;
    pub mod notice;
    pub mod register;
    pub mod schedule;
}

// 原生 Web API 封装模块
// 此模块提供对浏览器原生 API 的轻量级封装，替代 gloo-* 系列 crate，
// 以减小 WASM 二进制体积。
pub(crate) mod web {
    pub mod http;
    pub mod lifecycle;
    pub mod route;
    pub mod router;
    pub mod storage;
}

use leptos::prelude::*;

use crate::api::provide_api;
use crate::auth::provide_auth;
use crate::components::admin::appointments::AppointmentsPage;
use crate::components::admin::patient_detail::PatientDetailPage;
use crate::components::admin::patients::PatientsPage;
use crate::components::admin::stats::StatsPage;
use crate::components::chat::ChatPage;
use crate::components::landing::LandingPage;
use crate::components::login::LoginPage;
use crate::components::navbar::Navbar;
use crate::components::register::RegisterPage;
use crate::components::schedule::SchedulePage;
use crate::config::provide_config;
use crate::theme::provide_theme;
use web::route::AppRoute;
use web::router::{Link, Router, RouterOutlet};

/// 路由匹配函数
///
/// 根据 AppRoute 枚举返回对应的视图组件。
fn route_matcher(route: AppRoute) -> AnyView {
    match route {
        AppRoute::Landing => view! { <LandingPage /> }.into_any(),
        AppRoute::Login => view! { <LoginPage /> }.into_any(),
        AppRoute::Register => view! { <RegisterPage /> }.into_any(),
        AppRoute::Chat => view! { <ChatPage /> }.into_any(),
        AppRoute::Schedule => view! { <SchedulePage /> }.into_any(),
        AppRoute::Admin => view! { <AppointmentsPage /> }.into_any(),
        AppRoute::AdminPatients => view! { <PatientsPage /> }.into_any(),
        AppRoute::AdminPatientDetail(id) => view! { <PatientDetailPage id=id /> }.into_any(),
        AppRoute::AdminStats => view! { <StatsPage /> }.into_any(),
        AppRoute::NotFound => view! {
            <div class="flex items-center justify-center min-h-[80vh] bg-base-200">
                <div class="text-center">
                    <h1 class="text-6xl font-bold text-error">"404"</h1>
                    <p class="text-xl mt-4">"Página no encontrada"</p>
                    <Link to=AppRoute::Landing class="btn btn-ghost mt-4">"Volver al inicio"</Link>
                </div>
            </div>
        }
        .into_any(),
    }
}

#[component]
pub fn App() -> impl IntoView {
    // 1. 配置与主题
    let config = provide_config();
    provide_theme();

    // 2. 认证上下文：从 LocalStorage 恢复一次会话
    let auth = provide_auth();

    // 3. 后端接口
    provide_api(config);

    // 4. 路由器组件：注入会话信号实现守卫
    view! {
        <Router session=auth.principal_signal()>
            <Navbar />
            <main class="min-h-screen bg-base-200">
                <RouterOutlet matcher=route_matcher />
            </main>
        </Router>
    }
}
