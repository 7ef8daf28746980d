use consultorio_shared::chrono::Local;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::use_api;
use crate::auth::{SessionView, use_auth};
use crate::components::appointment_form::{AppointmentFields, AppointmentFormState, validate_draft};
use crate::components::notice::{Flash, Notice};

/// 患者预约页
#[component]
pub fn SchedulePage() -> impl IntoView {
    let auth = use_auth();
    let api = use_api();
    let form = AppointmentFormState::new();
    let (is_submitting, set_is_submitting) = signal(false);
    let flash = RwSignal::new(None::<Flash>);

    let user_id = auth.current_principal().map(|p| {
        form.paciente.set(p.display_name.clone());
        if p.identifier.contains('@') {
            form.email.set(p.identifier.clone());
        }
        p.identifier
    });

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let now = Local::now().naive_local();
        let mut draft = match validate_draft(form.snapshot(), Some(now)) {
            Ok(draft) => draft,
            Err(msg) => {
                flash.set(Some(Flash::error(msg)));
                return;
            }
        };
        draft.user_id = user_id.clone();

        set_is_submitting.set(true);
        let api = api.clone();
        spawn_local(async move {
            match api.create_appointment(draft).await {
                Ok(ack) => {
                    let msg = ack
                        .message()
                        .unwrap_or("Tu cita fue solicitada. Te contactaremos para confirmarla.");
                    flash.set(Some(Flash::success(msg)));
                    form.reset();
                }
                Err(e) => flash.set(Some(Flash::from_error("No se pudo agendar la cita", &e))),
            }
            set_is_submitting.set(false);
        });
    };

    view! {
        <div class="max-w-2xl mx-auto p-4">
            <div class="card bg-base-100 shadow-xl">
                <form class="card-body" on:submit=on_submit>
                    <h2 class="card-title">"Agendar una cita"</h2>
                    <Notice flash=flash />
                    <AppointmentFields form=form />
                    <div class="card-actions justify-end mt-4">
                        <button class="btn btn-primary" disabled=move || is_submitting.get()>
                            {move || if is_submitting.get() { "Enviando..." } else { "Solicitar cita" }}
                        </button>
                    </div>
                </form>
            </div>
        </div>
    }
}
