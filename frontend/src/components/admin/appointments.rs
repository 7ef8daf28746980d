//! 管理端：预约列表、编辑与删除

use consultorio_shared::Appointment;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::use_api;
use crate::components::appointment_form::{AppointmentFields, AppointmentFormState, validate_draft};
use crate::components::notice::{Flash, Notice, Spinner, confirm};

#[component]
pub fn AppointmentsPage() -> impl IntoView {
    // 处理器只捕获 Copy 句柄
    let api = StoredValue::new_local(use_api());

    let appointments = RwSignal::new(Vec::<Appointment>::new());
    let (loading, set_loading) = signal(true);
    let busy = RwSignal::new(false);
    let editing = RwSignal::new(None::<Appointment>);
    let form = AppointmentFormState::new();
    let flash = RwSignal::new(None::<Flash>);

    let load = move || {
        let api = api.get_value();
        set_loading.set(true);
        spawn_local(async move {
            match api.list_appointments().await {
                Ok(list) => appointments.set(list),
                Err(e) => flash.set(Some(Flash::from_error("Error al cargar las citas", &e))),
            }
            set_loading.set(false);
        });
    };
    load();

    let start_edit = move |appointment: Appointment| {
        form.fill(&appointment.draft);
        editing.set(Some(appointment));
    };

    let save = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let Some(original) = editing.get_untracked() else {
            return;
        };
        let updated = form.apply_to(&original);
        let draft = match validate_draft(updated.draft.clone(), None) {
            Ok(draft) => draft,
            Err(msg) => {
                flash.set(Some(Flash::error(msg)));
                return;
            }
        };
        let updated = Appointment { draft, ..updated };

        busy.set(true);
        let api = api.get_value();
        spawn_local(async move {
            match api.update_appointment(updated).await {
                Ok(ack) => {
                    flash.set(Some(Flash::success(ack.message().unwrap_or("Cita actualizada"))));
                    editing.set(None);
                    load();
                }
                Err(e) => flash.set(Some(Flash::from_error("No se pudo actualizar la cita", &e))),
            }
            busy.set(false);
        });
    };

    let remove = move |id: String| {
        if !confirm("¿Eliminar esta cita?") {
            return;
        }
        busy.set(true);
        let api = api.get_value();
        spawn_local(async move {
            match api.delete_appointment(&id).await {
                Ok(ack) => {
                    flash.set(Some(Flash::success(ack.message().unwrap_or("Cita eliminada"))));
                    appointments.update(|list| list.retain(|a| a.id != id));
                }
                Err(e) => flash.set(Some(Flash::from_error("No se pudo eliminar la cita", &e))),
            }
            busy.set(false);
        });
    };

    view! {
        <div class="max-w-6xl mx-auto p-4 space-y-4">
            <h2 class="text-2xl font-bold">"Citas"</h2>
            <Notice flash=flash />

            <Show when=move || editing.with(Option::is_some)>
                <div class="card bg-base-100 shadow">
                    <form class="card-body" on:submit=save>
                        <h3 class="card-title">"Editar cita"</h3>
                        <AppointmentFields form=form />
                        <div class="card-actions justify-end">
                            <button type="button" class="btn btn-ghost" on:click=move |_| editing.set(None)>
                                "Cancelar"
                            </button>
                            <button class="btn btn-primary" disabled=move || busy.get()>"Guardar"</button>
                        </div>
                    </form>
                </div>
            </Show>

            <Show when=move || !loading.get() fallback=|| view! { <Spinner label="Cargando citas..." /> }>
                <div class="overflow-x-auto bg-base-100 rounded-box shadow">
                    <table class="table table-zebra w-full">
                        <thead>
                            <tr>
                                <th>"Paciente"</th>
                                <th>"Fecha"</th>
                                <th>"Hora"</th>
                                <th class="hidden md:table-cell">"Motivo"</th>
                                <th>"Estado"</th>
                                <th></th>
                            </tr>
                        </thead>
                        <tbody>
                            <Show when=move || appointments.with(Vec::is_empty)>
                                <tr>
                                    <td colspan="6" class="text-center py-8 text-base-content/50">
                                        "No hay citas registradas."
                                    </td>
                                </tr>
                            </Show>
                            <For
                                each=move || appointments.get()
                                key=|a| a.id.clone()
                                children=move |appointment| {
                                    let id = appointment.id.clone();
                                    let row = appointment.clone();
                                    view! {
                                        <tr>
                                            <td>{appointment.draft.paciente}</td>
                                            <td>{appointment.draft.fecha}</td>
                                            <td>{appointment.draft.hora}</td>
                                            <td class="hidden md:table-cell">{appointment.draft.motivo}</td>
                                            <td><span class="badge badge-outline">{appointment.estado}</span></td>
                                            <td class="flex gap-1">
                                                <button
                                                    class="btn btn-ghost btn-xs"
                                                    disabled=move || busy.get()
                                                    on:click=move |_| start_edit(row.clone())
                                                >
                                                    "Editar"
                                                </button>
                                                <button
                                                    class="btn btn-ghost btn-xs text-error"
                                                    disabled=move || busy.get()
                                                    on:click=move |_| remove(id.clone())
                                                >
                                                    "Eliminar"
                                                </button>
                                            </td>
                                        </tr>
                                    }
                                }
                            />
                        </tbody>
                    </table>
                </div>
            </Show>
        </div>
    }
}
