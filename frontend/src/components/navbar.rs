use leptos::prelude::*;

use crate::auth::use_auth;
use crate::theme::{Theme, use_theme};
use crate::web::route::AppRoute;
use crate::web::router::Link;

/// 顶部导航栏：随会话与角色变化显示不同的入口
#[component]
pub fn Navbar() -> impl IntoView {
    let auth = use_auth();
    let principal = auth.principal_signal();
    let is_admin = move || principal.with(|p| p.as_ref().is_some_and(|p| p.is_admin()));

    let theme_toggle = use_theme().map(|theme| {
        let label = move || match theme.theme().get() {
            Theme::Light => "🌙",
            Theme::Dark => "☀️",
        };
        view! {
            <button class="btn btn-ghost btn-circle" title="Cambiar tema" on:click=move |_| theme.toggle()>
                {label}
            </button>
        }
    });

    view! {
        <div class="navbar bg-base-100 shadow">
            <div class="flex-1">
                <Link to=AppRoute::Landing class="btn btn-ghost text-xl">"Consultorio"</Link>
            </div>
            <div class="flex-none gap-2">
                <Show
                    when=move || principal.with(Option::is_some)
                    fallback=|| view! {
                        <Link to=AppRoute::Login class="btn btn-ghost btn-sm">"Iniciar sesión"</Link>
                        <Link to=AppRoute::Register class="btn btn-primary btn-sm">"Registrarse"</Link>
                    }
                >
                    <Show
                        when=is_admin
                        fallback=|| view! {
                            <Link to=AppRoute::Chat class="btn btn-ghost btn-sm">"Chat"</Link>
                            <Link to=AppRoute::Schedule class="btn btn-ghost btn-sm">"Agendar cita"</Link>
                        }
                    >
                        <Link to=AppRoute::Admin class="btn btn-ghost btn-sm">"Citas"</Link>
                        <Link to=AppRoute::AdminPatients class="btn btn-ghost btn-sm">"Pacientes"</Link>
                        <Link to=AppRoute::AdminStats class="btn btn-ghost btn-sm">"Estadísticas"</Link>
                    </Show>
                    <span class="badge badge-neutral hidden md:inline-flex">
                        {move || principal.with(|p| p.as_ref().map(|p| p.display_name.clone()).unwrap_or_default())}
                    </span>
                    <button class="btn btn-outline btn-error btn-sm" on:click=move |_| auth.logout()>
                        "Cerrar sesión"
                    </button>
                </Show>
                {theme_toggle}
            </div>
        </div>
    }
}
