use consultorio_shared::{ConversationSummary, DashboardStats};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::use_api;
use crate::components::notice::{Flash, Notice, Spinner};

/// 统计卡片的显示文本；后端未提供的计数显示为破折号
fn counter_text(value: Option<u64>) -> String {
    value.map(|n| n.to_string()).unwrap_or_else(|| "—".to_string())
}

/// 额外计数器的标题：`citas_confirmadas` → `Citas confirmadas`
fn counter_label(key: &str) -> String {
    let spaced = key.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[component]
fn StatCard(title: String, value: String) -> impl IntoView {
    view! {
        <div class="stat">
            <div class="stat-title">{title}</div>
            <div class="stat-value text-primary">{value}</div>
        </div>
    }
}

#[component]
pub fn StatsPage() -> impl IntoView {
    let api = use_api();

    let stats = RwSignal::new(None::<DashboardStats>);
    let reports = RwSignal::new(Vec::<ConversationSummary>::new());
    let (loading_reports, set_loading_reports) = signal(true);
    let flash = RwSignal::new(None::<Flash>);

    {
        let api = api.clone();
        spawn_local(async move {
            match api.dashboard().await {
                Ok(data) => stats.set(Some(data)),
                Err(e) => flash.set(Some(Flash::from_error("Error al cargar estadísticas", &e))),
            }
        });
    }
    spawn_local(async move {
        match api.list_reports().await {
            Ok(list) => reports.set(list),
            Err(e) => flash.set(Some(Flash::from_error("Error al cargar reportes", &e))),
        }
        set_loading_reports.set(false);
    });

    view! {
        <div class="max-w-6xl mx-auto p-4 space-y-4">
            <h2 class="text-2xl font-bold">"Estadísticas"</h2>
            <Notice flash=flash />

            {move || match stats.get() {
                None => view! { <Spinner label="Cargando estadísticas..." /> }.into_any(),
                Some(s) => {
                    let extra = s.extra_counters();
                    view! {
                        <div class="stats shadow w-full stats-vertical md:stats-horizontal bg-base-100">
                            <StatCard title="Pacientes".to_string() value=counter_text(s.total_pacientes) />
                            <StatCard title="Citas".to_string() value=counter_text(s.total_citas) />
                            <StatCard title="Citas pendientes".to_string() value=counter_text(s.citas_pendientes) />
                            <StatCard title="Conversaciones".to_string() value=counter_text(s.conversaciones) />
                            {extra.into_iter().map(|(k, v)| view! {
                                <StatCard title=counter_label(&k) value=v.to_string() />
                            }).collect_view()}
                        </div>
                    }.into_any()
                }
            }}

            <div class="card bg-base-100 shadow">
                <div class="card-body">
                    <h3 class="card-title">"Reportes de conversaciones"</h3>
                    <Show when=move || !loading_reports.get() fallback=|| view! { <Spinner /> }>
                        <Show when=move || reports.with(Vec::is_empty)>
                            <p class="text-base-content/50">"Aún no hay reportes."</p>
                        </Show>
                        <For
                            each=move || reports.get().into_iter().enumerate()
                            key=|(i, r)| (*i, r.user_id.clone())
                            children=|(_, r)| view! {
                                <div class="border-b border-base-200 py-2">
                                    <div class="text-xs text-base-content/60">
                                        {r.fecha} " · " {r.user_id}
                                    </div>
                                    <p class="whitespace-pre-wrap">{r.resumen}</p>
                                </div>
                            }
                        />
                    </Show>
                </div>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_counters_show_dash() {
        assert_eq!(counter_text(Some(4)), "4");
        assert_eq!(counter_text(None), "—");
    }

    #[test]
    fn extra_counter_labels_are_humanized() {
        assert_eq!(counter_label("citas_confirmadas"), "Citas confirmadas");
        assert_eq!(counter_label(""), "");
    }
}
