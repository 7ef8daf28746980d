//! 管理端：患者详情
//!
//! 三个只读面板（基本信息、SIGSA、病历）各自独立加载，失败互不影响；
//! 演进记录追加后整份患者记录通过 `update_patient` 回写。

use consultorio_shared::chrono::Local;
use consultorio_shared::date::DATE_FORMAT;
use consultorio_shared::{ClinicalNote, Patient};
use leptos::prelude::*;
use leptos::task::spawn_local;
use serde_json::Value;

use crate::api::use_api;
use crate::auth::{SessionView, use_auth};
use crate::components::notice::{Flash, Notice, Spinner};
use crate::error::ClientResult;
use crate::web::route::AppRoute;
use crate::web::router::Link;

/// 把后端返回的任意 JSON 展开为 (字段, 文本) 列表
///
/// 只有一个对象型字段的包装层（如 `{ "paciente": {...} }`）会被剥掉。
pub fn display_fields(value: &Value) -> Vec<(String, String)> {
    match value {
        Value::Object(map) if map.len() == 1 => match map.values().next() {
            Some(inner @ Value::Object(_)) => display_fields(inner),
            _ => object_fields(map),
        },
        Value::Object(map) => object_fields(map),
        Value::Null => Vec::new(),
        other => vec![(String::new(), display_text(other))],
    }
}

fn object_fields(map: &serde_json::Map<String, Value>) -> Vec<(String, String)> {
    map.iter()
        .map(|(k, v)| (k.replace('_', " "), display_text(v)))
        .collect()
}

fn display_text(value: &Value) -> String {
    match value {
        Value::Null => "—".to_string(),
        Value::String(s) => s.clone(),
        Value::Bool(true) => "Sí".to_string(),
        Value::Bool(false) => "No".to_string(),
        other => other.to_string(),
    }
}

#[component]
fn InfoPanel(title: &'static str, data: RwSignal<Option<ClientResult<Value>>>) -> impl IntoView {
    view! {
        <div class="card bg-base-100 shadow">
            <div class="card-body">
                <h3 class="card-title text-base">{title}</h3>
                {move || match data.get() {
                    None => view! { <Spinner /> }.into_any(),
                    Some(Err(e)) => view! {
                        <p class="text-error text-sm">{e.message().to_string()}</p>
                    }.into_any(),
                    Some(Ok(value)) => {
                        let fields = display_fields(&value);
                        if fields.is_empty() {
                            view! { <p class="text-base-content/50 text-sm">"Sin información"</p> }.into_any()
                        } else {
                            view! {
                                <dl class="grid grid-cols-2 gap-1 text-sm">
                                    {fields.into_iter().map(|(k, v)| view! {
                                        <dt class="font-semibold capitalize">{k}</dt>
                                        <dd>{v}</dd>
                                    }).collect_view()}
                                </dl>
                            }.into_any()
                        }
                    }
                }}
            </div>
        </div>
    }
}

#[component]
pub fn PatientDetailPage(id: String) -> impl IntoView {
    let api = use_api();
    let auth = use_auth();

    let patient = RwSignal::new(None::<Patient>);
    let info = RwSignal::new(None::<ClientResult<Value>>);
    let sigsa = RwSignal::new(None::<ClientResult<Value>>);
    let record = RwSignal::new(None::<ClientResult<Value>>);
    let note = RwSignal::new(String::new());
    let busy = RwSignal::new(false);
    let flash = RwSignal::new(None::<Flash>);

    {
        let api = api.clone();
        let id = id.clone();
        spawn_local(async move {
            match api.list_patients().await {
                Ok(list) => match list.into_iter().find(|p| p.id == id) {
                    Some(p) => patient.set(Some(p)),
                    None => flash.set(Some(Flash::error(format!("Paciente {} no encontrado", id)))),
                },
                Err(e) => flash.set(Some(Flash::from_error("Error al cargar el paciente", &e))),
            }
        });
    }
    {
        let api = api.clone();
        let id = id.clone();
        spawn_local(async move { info.set(Some(api.patient_info(&id).await)) });
    }
    {
        let api = api.clone();
        let id = id.clone();
        spawn_local(async move { sigsa.set(Some(api.sigsa_info(&id).await)) });
    }
    {
        let api = api.clone();
        let id = id.clone();
        spawn_local(async move { record.set(Some(api.medical_record(&id).await)) });
    }

    let add_note = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let contenido = note.get_untracked().trim().to_string();
        let Some(current) = patient.get_untracked() else {
            return;
        };
        if contenido.is_empty() {
            flash.set(Some(Flash::error("La nota no puede estar vacía")));
            return;
        }

        let entry = ClinicalNote {
            fecha: Local::now().format(DATE_FORMAT).to_string(),
            contenido,
            autor: auth.current_principal().map(|p| p.display_name),
        };

        busy.set(true);
        let api = api.clone();
        spawn_local(async move {
            match api.append_note(current.clone(), entry.clone()).await {
                Ok(_) => {
                    patient.update(|p| {
                        if let Some(p) = p {
                            p.notas_evolucion.push(entry);
                        }
                    });
                    note.set(String::new());
                    flash.set(Some(Flash::success("Nota agregada")));
                }
                Err(e) => flash.set(Some(Flash::from_error("No se pudo guardar la nota", &e))),
            }
            busy.set(false);
        });
    };

    view! {
        <div class="max-w-6xl mx-auto p-4 space-y-4">
            <div class="flex items-center gap-2">
                <Link to=AppRoute::AdminPatients class="btn btn-ghost btn-sm">"← Pacientes"</Link>
                <h2 class="text-2xl font-bold">
                    {move || patient.with(|p| p.as_ref().map(|p| p.nombre.clone()).unwrap_or_else(|| id.clone()))}
                </h2>
            </div>
            <Notice flash=flash />

            <div class="grid grid-cols-1 lg:grid-cols-3 gap-4">
                <InfoPanel title="Información del paciente" data=info />
                <InfoPanel title="SIGSA" data=sigsa />
                <InfoPanel title="Ficha médica" data=record />
            </div>

            <div class="card bg-base-100 shadow">
                <div class="card-body">
                    <h3 class="card-title text-base">"Notas de evolución"</h3>
                    <ul class="timeline timeline-vertical timeline-compact">
                        <For
                            each=move || patient.with(|p| p.as_ref().map(|p| p.notas_evolucion.clone()).unwrap_or_default()).into_iter().enumerate()
                            key=|(i, n)| (*i, n.fecha.clone())
                            children=|(_, n)| view! {
                                <li class="p-2 border-b border-base-200">
                                    <div class="text-xs text-base-content/60">
                                        {n.fecha} " · " {n.autor.unwrap_or_default()}
                                    </div>
                                    <p class="whitespace-pre-wrap">{n.contenido}</p>
                                </li>
                            }
                        />
                    </ul>
                    <form class="space-y-2" on:submit=add_note>
                        <textarea
                            class="textarea textarea-bordered w-full"
                            placeholder="Nueva nota de evolución..."
                            on:input=move |ev| note.set(event_target_value(&ev))
                            prop:value=note
                        ></textarea>
                        <button
                            class="btn btn-primary btn-sm"
                            disabled=move || busy.get() || patient.with(Option::is_none)
                        >
                            "Agregar nota"
                        </button>
                    </form>
                </div>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn single_object_wrapper_is_unwrapped() {
        let fields = display_fields(&json!({ "paciente": { "nombre": "Ana", "edad": 30 } }));
        assert_eq!(
            fields,
            vec![
                ("edad".to_string(), "30".to_string()),
                ("nombre".to_string(), "Ana".to_string())
            ]
        );
    }

    #[test]
    fn scalars_are_humanized() {
        let fields = display_fields(&json!({ "grupo_sanguineo": null, "alergias": false }));
        assert!(fields.contains(&("grupo sanguineo".to_string(), "—".to_string())));
        assert!(fields.contains(&("alergias".to_string(), "No".to_string())));
    }

    #[test]
    fn non_object_payloads() {
        assert!(display_fields(&Value::Null).is_empty());
        assert_eq!(
            display_fields(&json!("sin registros")),
            vec![(String::new(), "sin registros".to_string())]
        );
    }
}
