//! 预约表单
//!
//! 患者预约页与管理端编辑共用：
//! - `AppointmentFormState`: 把零散的 signal 整合成一个 `Copy` 结构体
//! - `AppointmentFields`: 表单字段视图
//! - `validate_draft`: 纯函数校验，日期时间规范化为 `YYYY-MM-DD` / `HH:MM`

use consultorio_shared::chrono::NaiveDateTime;
use consultorio_shared::date::AppointmentSlot;
use consultorio_shared::{Appointment, AppointmentDraft};
use leptos::prelude::*;

/// 表单状态结构体
///
/// 使用 `RwSignal` 因为它实现了 `Copy` trait，非常适合作为 Props 在组件间传递。
#[derive(Clone, Copy)]
pub struct AppointmentFormState {
    pub paciente: RwSignal<String>,
    pub email: RwSignal<String>,
    pub telefono: RwSignal<String>,
    pub fecha: RwSignal<String>,
    pub hora: RwSignal<String>,
    pub motivo: RwSignal<String>,
}

impl AppointmentFormState {
    pub fn new() -> Self {
        Self {
            paciente: RwSignal::new(String::new()),
            email: RwSignal::new(String::new()),
            telefono: RwSignal::new(String::new()),
            fecha: RwSignal::new(String::new()),
            hora: RwSignal::new(String::new()),
            motivo: RwSignal::new(String::new()),
        }
    }

    /// 只清空与本次预约相关的字段，保留联系方式
    pub fn reset(&self) {
        self.fecha.set(String::new());
        self.hora.set(String::new());
        self.motivo.set(String::new());
    }

    pub fn fill(&self, draft: &AppointmentDraft) {
        self.paciente.set(draft.paciente.clone());
        self.email.set(draft.email.clone());
        self.telefono.set(draft.telefono.clone());
        self.fecha.set(draft.fecha.clone());
        self.hora.set(draft.hora.clone());
        self.motivo.set(draft.motivo.clone());
    }

    pub fn snapshot(&self) -> AppointmentDraft {
        AppointmentDraft {
            paciente: self.paciente.get_untracked(),
            email: self.email.get_untracked(),
            telefono: self.telefono.get_untracked(),
            fecha: self.fecha.get_untracked(),
            hora: self.hora.get_untracked(),
            motivo: self.motivo.get_untracked(),
            user_id: None,
        }
    }

    /// 以表单内容覆盖已有预约的可编辑字段
    pub fn apply_to(&self, appointment: &Appointment) -> Appointment {
        let mut updated = appointment.clone();
        let user_id = updated.draft.user_id.take();
        updated.draft = AppointmentDraft {
            user_id,
            ..self.snapshot()
        };
        updated
    }
}

impl Default for AppointmentFormState {
    fn default() -> Self {
        Self::new()
    }
}

/// 校验并规范化预约
///
/// 给出 `not_before` 时要求预约时间晚于它（患者新建预约）；
/// 管理端编辑历史预约时不限制。
pub fn validate_draft(
    mut draft: AppointmentDraft,
    not_before: Option<NaiveDateTime>,
) -> Result<AppointmentDraft, String> {
    draft.paciente = draft.paciente.trim().to_string();
    draft.email = draft.email.trim().to_string();
    draft.telefono = draft.telefono.trim().to_string();
    draft.motivo = draft.motivo.trim().to_string();

    if draft.paciente.is_empty() {
        return Err("El nombre del paciente es obligatorio".to_string());
    }
    if draft.email.is_empty() && draft.telefono.is_empty() {
        return Err("Indica un correo o un teléfono de contacto".to_string());
    }

    let slot = match not_before {
        Some(now) => AppointmentSlot::parse_future(&draft.fecha, &draft.hora, now),
        None => AppointmentSlot::parse(&draft.fecha, &draft.hora),
    }
    .map_err(|e| e.to_string())?;

    draft.fecha = slot.fecha();
    draft.hora = slot.hora();
    Ok(draft)
}

#[component]
pub fn AppointmentFields(form: AppointmentFormState) -> impl IntoView {
    let input = move |label: &'static str, kind: &'static str, value: RwSignal<String>| {
        view! {
            <div class="form-control">
                <label class="label">
                    <span class="label-text">{label}</span>
                </label>
                <input
                    type=kind
                    on:input=move |ev| value.set(event_target_value(&ev))
                    prop:value=value
                    class="input input-bordered"
                />
            </div>
        }
    };

    view! {
        <div class="grid grid-cols-1 md:grid-cols-2 gap-2">
            {input("Paciente", "text", form.paciente)}
            {input("Correo", "email", form.email)}
            {input("Teléfono", "tel", form.telefono)}
            {input("Fecha", "date", form.fecha)}
            {input("Hora", "time", form.hora)}
        </div>
        <div class="form-control">
            <label class="label">
                <span class="label-text">"Motivo de consulta"</span>
            </label>
            <textarea
                class="textarea textarea-bordered"
                on:input=move |ev| form.motivo.set(event_target_value(&ev))
                prop:value=form.motivo
            ></textarea>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use consultorio_shared::chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 10)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn draft(fecha: &str, hora: &str) -> AppointmentDraft {
        AppointmentDraft {
            paciente: " Ana ".into(),
            email: "ana@correo.com".into(),
            fecha: fecha.into(),
            hora: hora.into(),
            motivo: "ansiedad".into(),
            ..Default::default()
        }
    }

    #[test]
    fn future_slot_is_normalized() {
        let ok = validate_draft(draft("2025-03-11", "09:30:00"), Some(now())).unwrap();
        assert_eq!(ok.paciente, "Ana");
        assert_eq!(ok.hora, "09:30");
    }

    #[test]
    fn past_slot_is_rejected_only_when_bounded() {
        let err = validate_draft(draft("2025-03-10", "11:59"), Some(now())).unwrap_err();
        assert!(err.contains("futura"));

        assert!(validate_draft(draft("2025-03-10", "11:59"), None).is_ok());
    }

    #[test]
    fn malformed_inputs_are_rejected() {
        assert!(validate_draft(draft("10/03/2025", "10:00"), None).is_err());
        assert!(validate_draft(draft("2025-03-11", "25:00"), None).is_err());
    }

    #[test]
    fn contact_is_required() {
        let mut d = draft("2025-03-11", "10:00");
        d.email.clear();
        assert!(validate_draft(d.clone(), None).is_err());
        d.telefono = "555-1234".into();
        assert!(validate_draft(d, None).is_ok());
    }

    #[test]
    fn apply_to_keeps_identity_and_owner() {
        let form = AppointmentFormState::new();
        form.fill(&draft("2025-04-01", "10:00"));
        form.motivo.set("seguimiento".into());

        let original = Appointment {
            id: "c9".into(),
            draft: AppointmentDraft {
                user_id: Some("u1".into()),
                ..Default::default()
            },
            estado: "pendiente".into(),
        };
        let updated = form.apply_to(&original);
        assert_eq!(updated.id, "c9");
        assert_eq!(updated.estado, "pendiente");
        assert_eq!(updated.draft.user_id.as_deref(), Some("u1"));
        assert_eq!(updated.draft.motivo, "seguimiento");
    }
}
