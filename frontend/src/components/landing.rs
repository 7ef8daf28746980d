use leptos::prelude::*;

use crate::web::route::AppRoute;
use crate::web::router::Link;

#[component]
pub fn LandingPage() -> impl IntoView {
    view! {
        <div class="hero min-h-[80vh] bg-base-200">
            <div class="hero-content text-center">
                <div class="max-w-md">
                    <h1 class="text-4xl font-bold">"Tu espacio de bienestar"</h1>
                    <p class="py-6 text-base-content/70">
                        "Conversa con nuestro asistente, agenda una cita con la psicóloga y lleva un seguimiento de tu proceso."
                    </p>
                    <div class="flex justify-center gap-2">
                        <Link to=AppRoute::Login class="btn btn-primary">"Iniciar sesión"</Link>
                        <Link to=AppRoute::Register class="btn btn-outline">"Crear cuenta"</Link>
                    </div>
                </div>
            </div>
        </div>
    }
}
