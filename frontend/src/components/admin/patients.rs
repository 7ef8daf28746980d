//! 管理端：患者名册
//!
//! 新建与修改都走 `update_patient` 的 upsert，删除使用 `accion: "delete"`。

use consultorio_shared::Patient;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::use_api;
use crate::components::notice::{Flash, Notice, Spinner, confirm};
use crate::web::route::AppRoute;
use crate::web::router::Link;

#[derive(Clone, Copy)]
struct PatientFormState {
    /// 正在编辑的患者；`None` 表示新建
    base: RwSignal<Option<Patient>>,
    nombre: RwSignal<String>,
    email: RwSignal<String>,
    telefono: RwSignal<String>,
    edad: RwSignal<String>,
    notas: RwSignal<String>,
}

impl PatientFormState {
    fn new() -> Self {
        Self {
            base: RwSignal::new(None),
            nombre: RwSignal::new(String::new()),
            email: RwSignal::new(String::new()),
            telefono: RwSignal::new(String::new()),
            edad: RwSignal::new(String::new()),
            notas: RwSignal::new(String::new()),
        }
    }

    fn fill(&self, patient: Option<Patient>) {
        let p = patient.clone().unwrap_or_default();
        self.nombre.set(p.nombre);
        self.email.set(p.email);
        self.telefono.set(p.telefono);
        self.edad.set(p.edad.map(|e| e.to_string()).unwrap_or_default());
        self.notas.set(p.notas.unwrap_or_default());
        self.base.set(patient);
    }

    fn to_patient(&self) -> Result<Patient, String> {
        build_patient(
            self.base.get_untracked().unwrap_or_default(),
            PatientInput {
                nombre: self.nombre.get_untracked(),
                email: self.email.get_untracked(),
                telefono: self.telefono.get_untracked(),
                edad: self.edad.get_untracked(),
                notas: self.notas.get_untracked(),
            },
        )
    }
}

struct PatientInput {
    nombre: String,
    email: String,
    telefono: String,
    edad: String,
    notas: String,
}

/// 以表单输入覆盖患者的可编辑字段，其余字段（含未知字段）原样保留
fn build_patient(mut patient: Patient, input: PatientInput) -> Result<Patient, String> {
    let nombre = input.nombre.trim();
    if nombre.is_empty() {
        return Err("El nombre es obligatorio".to_string());
    }

    let edad = match input.edad.trim() {
        "" => None,
        raw => match raw.parse::<u32>() {
            Ok(n) if n <= 120 => Some(n),
            _ => return Err(format!("Edad inválida: {}", raw)),
        },
    };

    let notas = input.notas.trim();
    patient.nombre = nombre.to_string();
    patient.email = input.email.trim().to_string();
    patient.telefono = input.telefono.trim().to_string();
    patient.edad = edad;
    patient.notas = (!notas.is_empty()).then(|| notas.to_string());
    Ok(patient)
}

#[component]
pub fn PatientsPage() -> impl IntoView {
    // 处理器只捕获 Copy 句柄
    let api = StoredValue::new_local(use_api());

    let patients = RwSignal::new(Vec::<Patient>::new());
    let (loading, set_loading) = signal(true);
    let busy = RwSignal::new(false);
    let show_form = RwSignal::new(false);
    let form = PatientFormState::new();
    let flash = RwSignal::new(None::<Flash>);

    let load = move || {
        let api = api.get_value();
        set_loading.set(true);
        spawn_local(async move {
            match api.list_patients().await {
                Ok(list) => patients.set(list),
                Err(e) => flash.set(Some(Flash::from_error("Error al cargar pacientes", &e))),
            }
            set_loading.set(false);
        });
    };
    load();

    let open_form = move |patient: Option<Patient>| {
        form.fill(patient);
        show_form.set(true);
    };

    let save = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let patient = match form.to_patient() {
            Ok(p) => p,
            Err(msg) => {
                flash.set(Some(Flash::error(msg)));
                return;
            }
        };

        busy.set(true);
        let api = api.get_value();
        spawn_local(async move {
            match api.upsert_patient(patient).await {
                Ok(ack) => {
                    flash.set(Some(Flash::success(ack.message().unwrap_or("Paciente guardado"))));
                    show_form.set(false);
                    load();
                }
                Err(e) => flash.set(Some(Flash::from_error("No se pudo guardar el paciente", &e))),
            }
            busy.set(false);
        });
    };

    let remove = move |id: String| {
        if !confirm("¿Eliminar este paciente y su historial?") {
            return;
        }
        busy.set(true);
        let api = api.get_value();
        spawn_local(async move {
            match api.delete_patient(&id).await {
                Ok(ack) => {
                    flash.set(Some(Flash::success(ack.message().unwrap_or("Paciente eliminado"))));
                    patients.update(|list| list.retain(|p| p.id != id));
                }
                Err(e) => flash.set(Some(Flash::from_error("No se pudo eliminar el paciente", &e))),
            }
            busy.set(false);
        });
    };

    let input = move |label: &'static str, kind: &'static str, value: RwSignal<String>| {
        view! {
            <div class="form-control">
                <label class="label"><span class="label-text">{label}</span></label>
                <input
                    type=kind
                    class="input input-bordered"
                    on:input=move |ev| value.set(event_target_value(&ev))
                    prop:value=value
                />
            </div>
        }
    };

    view! {
        <div class="max-w-6xl mx-auto p-4 space-y-4">
            <div class="flex items-center justify-between">
                <h2 class="text-2xl font-bold">"Pacientes"</h2>
                <button class="btn btn-primary btn-sm" on:click=move |_| open_form(None)>
                    "Nuevo paciente"
                </button>
            </div>
            <Notice flash=flash />

            <Show when=move || show_form.get()>
                <div class="card bg-base-100 shadow">
                    <form class="card-body" on:submit=save>
                        <h3 class="card-title">
                            {move || if form.base.with(Option::is_some) { "Editar paciente" } else { "Nuevo paciente" }}
                        </h3>
                        <div class="grid grid-cols-1 md:grid-cols-2 gap-2">
                            {input("Nombre", "text", form.nombre)}
                            {input("Correo", "email", form.email)}
                            {input("Teléfono", "tel", form.telefono)}
                            {input("Edad", "number", form.edad)}
                        </div>
                        <div class="form-control">
                            <label class="label"><span class="label-text">"Notas"</span></label>
                            <textarea
                                class="textarea textarea-bordered"
                                on:input=move |ev| form.notas.set(event_target_value(&ev))
                                prop:value=form.notas
                            ></textarea>
                        </div>
                        <div class="card-actions justify-end">
                            <button type="button" class="btn btn-ghost" on:click=move |_| show_form.set(false)>
                                "Cancelar"
                            </button>
                            <button class="btn btn-primary" disabled=move || busy.get()>"Guardar"</button>
                        </div>
                    </form>
                </div>
            </Show>

            <Show when=move || !loading.get() fallback=|| view! { <Spinner label="Cargando pacientes..." /> }>
                <div class="overflow-x-auto bg-base-100 rounded-box shadow">
                    <table class="table table-zebra w-full">
                        <thead>
                            <tr>
                                <th>"Nombre"</th>
                                <th>"Correo"</th>
                                <th class="hidden md:table-cell">"Teléfono"</th>
                                <th class="hidden md:table-cell">"Edad"</th>
                                <th></th>
                            </tr>
                        </thead>
                        <tbody>
                            <Show when=move || patients.with(Vec::is_empty)>
                                <tr>
                                    <td colspan="5" class="text-center py-8 text-base-content/50">
                                        "No hay pacientes registrados."
                                    </td>
                                </tr>
                            </Show>
                            <For
                                each=move || patients.get()
                                key=|p| p.id.clone()
                                children=move |patient| {
                                    let id = patient.id.clone();
                                    let row = patient.clone();
                                    view! {
                                        <tr>
                                            <td>
                                                <Link to=AppRoute::AdminPatientDetail(patient.id.clone()) class="link link-primary">
                                                    {patient.nombre.clone()}
                                                </Link>
                                            </td>
                                            <td>{patient.email.clone()}</td>
                                            <td class="hidden md:table-cell">{patient.telefono.clone()}</td>
                                            <td class="hidden md:table-cell">
                                                {patient.edad.map(|e| e.to_string()).unwrap_or_default()}
                                            </td>
                                            <td class="flex gap-1">
                                                <button
                                                    class="btn btn-ghost btn-xs"
                                                    disabled=move || busy.get()
                                                    on:click=move |_| open_form(Some(row.clone()))
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

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input(nombre: &str, edad: &str) -> PatientInput {
        PatientInput {
            nombre: nombre.into(),
            email: " ana@correo.com ".into(),
            telefono: String::new(),
            edad: edad.into(),
            notas: "  ".into(),
        }
    }

    #[test]
    fn builds_new_patient() {
        let p = build_patient(Patient::default(), input("Ana", "30")).unwrap();
        assert_eq!(p.nombre, "Ana");
        assert_eq!(p.email, "ana@correo.com");
        assert_eq!(p.edad, Some(30));
        assert_eq!(p.notas, None);
    }

    #[test]
    fn keeps_identity_and_unknown_fields_on_edit() {
        let mut base = Patient {
            id: "p1".into(),
            ..Default::default()
        };
        base.extra.insert("rut".into(), json!("11.111.111-1"));

        let p = build_patient(base, input("Ana María", "")).unwrap();
        assert_eq!(p.id, "p1");
        assert_eq!(p.edad, None);
        assert_eq!(p.extra["rut"], json!("11.111.111-1"));
    }

    #[test]
    fn rejects_missing_name_and_bad_age() {
        assert!(build_patient(Patient::default(), input(" ", "30")).is_err());
        assert!(build_patient(Patient::default(), input("Ana", "treinta")).is_err());
        assert!(build_patient(Patient::default(), input("Ana", "300")).is_err());
    }
}
