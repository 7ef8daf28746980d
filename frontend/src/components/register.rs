use consultorio_shared::protocol::CreateUserRequest;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::use_api;
use crate::components::notice::{Flash, Notice};
use crate::web::route::AppRoute;
use crate::web::router::Link;

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registration {
    pub nombre: String,
    pub email: String,
    pub password: String,
    pub confirmation: String,
}

impl Registration {
    pub fn into_request(self) -> Result<CreateUserRequest, &'static str> {
        let nombre = self.nombre.trim();
        let email = self.email.trim();
        if nombre.is_empty() || email.is_empty() {
            return Err("El nombre y el correo son obligatorios");
        }
        if !email.contains('@') {
            return Err("El correo no es válido");
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err("La contraseña debe tener al menos 6 caracteres");
        }
        if self.password != self.confirmation {
            return Err("Las contraseñas no coinciden");
        }
        Ok(CreateUserRequest {
            nombre: nombre.to_string(),
            email: email.to_string(),
            password: self.password,
        })
    }
}

#[component]
pub fn RegisterPage() -> impl IntoView {
    let api = use_api();

    let nombre = RwSignal::new(String::new());
    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let confirmation = RwSignal::new(String::new());
    let (is_submitting, set_is_submitting) = signal(false);
    let flash = RwSignal::new(None::<Flash>);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let form = Registration {
            nombre: nombre.get(),
            email: email.get(),
            password: password.get(),
            confirmation: confirmation.get(),
        };
        let request = match form.into_request() {
            Ok(request) => request,
            Err(msg) => {
                flash.set(Some(Flash::error(msg)));
                return;
            }
        };

        set_is_submitting.set(true);
        let api = api.clone();
        spawn_local(async move {
            match api.create_user(&request).await {
                Ok(ack) => {
                    let msg = ack.message().unwrap_or("Cuenta creada. Ya puedes iniciar sesión.");
                    flash.set(Some(Flash::success(msg)));
                    password.set(String::new());
                    confirmation.set(String::new());
                }
                Err(e) => flash.set(Some(Flash::from_error("No se pudo crear la cuenta", &e))),
            }
            set_is_submitting.set(false);
        });
    };

    let field = move |id: &'static str, label: &'static str, kind: &'static str, value: RwSignal<String>| {
        view! {
            <div class="form-control">
                <label class="label" for=id>
                    <span class="label-text">{label}</span>
                </label>
                <input
                    id=id
                    type=kind
                    on:input=move |ev| value.set(event_target_value(&ev))
                    prop:value=value
                    class="input input-bordered"
                    required
                />
            </div>
        }
    };

    view! {
        <div class="hero min-h-[80vh] bg-base-200">
            <div class="hero-content flex-col w-full max-w-md">
                <h1 class="text-3xl font-bold">"Crear cuenta"</h1>
                <div class="card shrink-0 w-full shadow-2xl bg-base-100">
                    <form class="card-body" on:submit=on_submit>
                        <Notice flash=flash />
                        {field("nombre", "Nombre completo", "text", nombre)}
                        {field("email", "Correo electrónico", "email", email)}
                        {field("password", "Contraseña", "password", password)}
                        {field("confirmation", "Confirmar contraseña", "password", confirmation)}
                        <div class="form-control mt-6">
                            <button class="btn btn-primary" disabled=move || is_submitting.get()>
                                {move || if is_submitting.get() { "Creando..." } else { "Registrarse" }}
                            </button>
                        </div>
                        <Link to=AppRoute::Login class="link link-hover text-sm text-center">
                            "¿Ya tienes cuenta? Inicia sesión"
                        </Link>
                    </form>
                </div>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> Registration {
        Registration {
            nombre: " Ana Pérez ".into(),
            email: "ana@correo.com".into(),
            password: "123456".into(),
            confirmation: "123456".into(),
        }
    }

    #[test]
    fn valid_form_builds_trimmed_request() {
        let req = form().into_request().unwrap();
        assert_eq!(req.nombre, "Ana Pérez");
        assert_eq!(req.password, "123456");
    }

    #[test]
    fn short_password_is_rejected() {
        let mut f = form();
        f.password = "12345".into();
        f.confirmation = "12345".into();
        assert!(f.into_request().unwrap_err().contains("6"));
    }

    #[test]
    fn confirmation_must_match() {
        let mut f = form();
        f.confirmation = "654321".into();
        assert_eq!(f.into_request().unwrap_err(), "Las contraseñas no coinciden");
    }

    #[test]
    fn email_needs_at_sign() {
        let mut f = form();
        f.email = "ana.correo.com".into();
        assert!(f.into_request().is_err());
    }
}
