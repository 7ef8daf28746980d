//! 登录页
//!
//! 目前没有后端凭据校验：表单通过必填校验后，经过一段模拟延迟在本地生成 `Principal`。
//! 替换为真实认证时只需改动 `Credentials::into_principal` 所在的提交流程。

use consultorio_shared::Principal;
use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::auth::{default_route_for, use_auth};
use crate::components::notice::{Flash, Notice};
use crate::config::use_config;
use crate::web::router::use_navigate;

/// 登录表单内容
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub identifier: String,
    pub display_name: String,
    pub password: String,
}

impl Credentials {
    /// 必填校验，返回可直接展示的错误
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.identifier.trim().is_empty()
            || self.display_name.trim().is_empty()
            || self.password.is_empty()
        {
            return Err("Por favor completa todos los campos");
        }
        Ok(())
    }

    /// 本地生成会话主体；管理员身份由显示名推导
    pub fn into_principal(self) -> Principal {
        Principal::new(self.identifier.trim(), self.display_name.trim())
    }
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let auth = use_auth();
    let navigate = use_navigate();
    let delay_ms = use_config().login_delay_ms;

    let (identifier, set_identifier) = signal(String::new());
    let (display_name, set_display_name) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (is_submitting, set_is_submitting) = signal(false);
    let flash = RwSignal::new(None::<Flash>);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let credentials = Credentials {
            identifier: identifier.get(),
            display_name: display_name.get(),
            password: password.get(),
        };
        if let Err(msg) = credentials.validate() {
            flash.set(Some(Flash::error(msg)));
            return;
        }

        set_is_submitting.set(true);
        flash.set(None);

        spawn_local(async move {
            TimeoutFuture::new(delay_ms).await;
            let principal = credentials.into_principal();
            let target = default_route_for(&principal);
            auth.login(principal);
            set_is_submitting.set(false);
            navigate(target);
        });
    };

    view! {
        <div class="hero min-h-[80vh] bg-base-200">
            <div class="hero-content flex-col w-full max-w-md">
                <div class="text-center mb-4">
                    <h1 class="text-3xl font-bold">"Iniciar sesión"</h1>
                    <p class="text-base-content/70">"Ingresa tus datos para continuar"</p>
                </div>

                <div class="card shrink-0 w-full shadow-2xl bg-base-100">
                    <form class="card-body" on:submit=on_submit>
                        <Notice flash=flash />

                        <div class="form-control">
                            <label class="label" for="identifier">
                                <span class="label-text">"Correo electrónico"</span>
                            </label>
                            <input
                                id="identifier"
                                type="email"
                                placeholder="correo@ejemplo.com"
                                on:input=move |ev| set_identifier.set(event_target_value(&ev))
                                prop:value=identifier
                                class="input input-bordered"
                                required
                            />
                        </div>
                        <div class="form-control">
                            <label class="label" for="display-name">
                                <span class="label-text">"Nombre"</span>
                            </label>
                            <input
                                id="display-name"
                                type="text"
                                on:input=move |ev| set_display_name.set(event_target_value(&ev))
                                prop:value=display_name
                                class="input input-bordered"
                                required
                            />
                        </div>
                        <div class="form-control">
                            <label class="label" for="password">
                                <span class="label-text">"Contraseña"</span>
                            </label>
                            <input
                                id="password"
                                type="password"
                                placeholder="••••••••"
                                on:input=move |ev| set_password.set(event_target_value(&ev))
                                prop:value=password
                                class="input input-bordered"
                                required
                            />
                        </div>
                        <div class="form-control mt-6">
                            <button class="btn btn-primary" disabled=move || is_submitting.get()>
                                {move || if is_submitting.get() {
                                    view! { <span class="loading loading-spinner"></span> "Ingresando..." }.into_any()
                                } else {
                                    "Ingresar".into_any()
                                }}
                            </button>
                        </div>
                    </form>
                </div>
            </div>
        </div>
    }
}
