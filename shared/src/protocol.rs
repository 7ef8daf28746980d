//! 后端接口目录
//!
//! 每个请求类型通过 `ApiRequest` 声明路径、方法与响应类型，
//! 列表类接口额外通过 `ListRequest` 声明后端可能使用的包装键。

use crate::{Ack, Appointment, AppointmentDraft, ClinicalNote, DashboardStats, Patient};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

/// HTTP Methods for API Requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
}

/// A trait that defines the request-response relationship and metadata for an API endpoint.
pub trait ApiRequest: Serialize {
    /// The response type returned by this request.
    type Response: DeserializeOwned;
    /// The URL path (relative to the API base).
    const PATH: &'static str;
    /// The HTTP method.
    const METHOD: HttpMethod;
}

/// 返回列表的接口
///
/// 后端对同一类接口可能返回裸数组、`{ data: [...] }` 或业务专用键，
/// `WRAPPER_KEYS` 按优先级列出业务专用键。
pub trait ListRequest: Serialize {
    type Item: DeserializeOwned;
    const PATH: &'static str;
    const WRAPPER_KEYS: &'static [&'static str];
}

// =========================================================
// 账号 (Accounts)
// =========================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub nombre: String,
    pub email: String,
    pub password: String,
}

impl ApiRequest for CreateUserRequest {
    type Response = Ack;
    const PATH: &'static str = "/api/create_user";
    const METHOD: HttpMethod = HttpMethod::Post;
}

// =========================================================
// 患者 (Patients)
// =========================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListPatientsRequest;

impl ListRequest for ListPatientsRequest {
    type Item = Patient;
    const PATH: &'static str = "/api/listar_todos_pacientes";
    const WRAPPER_KEYS: &'static [&'static str] = &["patients", "pacientes"];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatientAction {
    Upsert,
    Delete,
}

/// 新建/更新/删除患者共用同一个接口
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePatientRequest {
    pub accion: PatientAction,
    #[serde(flatten)]
    pub patient: Patient,
}

impl UpdatePatientRequest {
    pub fn upsert(patient: Patient) -> Self {
        Self {
            accion: PatientAction::Upsert,
            patient,
        }
    }

    pub fn delete(id: impl Into<String>) -> Self {
        Self {
            accion: PatientAction::Delete,
            patient: Patient {
                id: id.into(),
                ..Default::default()
            },
        }
    }

    /// 追加一条演进记录
    pub fn append_note(mut patient: Patient, note: ClinicalNote) -> Self {
        patient.notas_evolucion.push(note);
        Self::upsert(patient)
    }
}

impl ApiRequest for UpdatePatientRequest {
    type Response = Ack;
    const PATH: &'static str = "/api/update_patient";
    const METHOD: HttpMethod = HttpMethod::Post;
}

/// 患者详情查询的公共请求体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientLookup {
    pub paciente_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatientInfoRequest(pub PatientLookup);

impl ApiRequest for PatientInfoRequest {
    type Response = Value;
    const PATH: &'static str = "/api/paciente_info";
    const METHOD: HttpMethod = HttpMethod::Post;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SigsaInfoRequest(pub PatientLookup);

impl ApiRequest for SigsaInfoRequest {
    type Response = Value;
    const PATH: &'static str = "/api/sigsa_info";
    const METHOD: HttpMethod = HttpMethod::Post;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MedicalRecordRequest(pub PatientLookup);

impl ApiRequest for MedicalRecordRequest {
    type Response = Value;
    const PATH: &'static str = "/api/ficha_medica_info";
    const METHOD: HttpMethod = HttpMethod::Post;
}

// =========================================================
// 统计 (Dashboard)
// =========================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardRequest;

impl ApiRequest for DashboardRequest {
    type Response = DashboardStats;
    const PATH: &'static str = "/api/get_dashboard_data";
    const METHOD: HttpMethod = HttpMethod::Get;
}

// =========================================================
// 预约 (Appointments)
// =========================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListAppointmentsRequest;

impl ListRequest for ListAppointmentsRequest {
    type Item = Appointment;
    const PATH: &'static str = "/api/listar_citas_consultorio";
    const WRAPPER_KEYS: &'static [&'static str] = &["citas"];
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CreateAppointmentRequest(pub AppointmentDraft);

impl ApiRequest for CreateAppointmentRequest {
    type Response = Ack;
    const PATH: &'static str = "/api/crear_cita_consultorio";
    const METHOD: HttpMethod = HttpMethod::Post;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UpdateAppointmentRequest(pub Appointment);

impl ApiRequest for UpdateAppointmentRequest {
    type Response = Ack;
    const PATH: &'static str = "/api/actualizar_cita_consultorio";
    const METHOD: HttpMethod = HttpMethod::Post;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteAppointmentRequest {
    pub id: String,
}

impl ApiRequest for DeleteAppointmentRequest {
    type Response = Ack;
    const PATH: &'static str = "/api/eliminar_cita_consultorio";
    const METHOD: HttpMethod = HttpMethod::Post;
}

/// 聊天机器人报告列表的包装键（报告接口地址由配置提供）
pub const REPORT_WRAPPER_KEYS: &[&str] = &["reportes"];

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn delete_patient_body_carries_action_and_id() {
        let body = serde_json::to_value(UpdatePatientRequest::delete("p9")).unwrap();
        assert_eq!(body["accion"], "delete");
        assert_eq!(body["id"], "p9");
    }

    #[test]
    fn lookup_requests_serialize_flat() {
        let req = SigsaInfoRequest(PatientLookup {
            paciente_id: "p1".into(),
        });
        assert_eq!(serde_json::to_value(&req).unwrap(), json!({ "paciente_id": "p1" }));
    }

    #[test]
    fn append_note_keeps_existing_notes() {
        let patient = Patient {
            id: "p1".into(),
            notas_evolucion: vec![ClinicalNote {
                fecha: "2030-01-01".into(),
                contenido: "primera".into(),
                autor: None,
            }],
            ..Default::default()
        };
        let req = UpdatePatientRequest::append_note(
            patient,
            ClinicalNote {
                fecha: "2030-01-08".into(),
                contenido: "segunda".into(),
                autor: Some("psicologa".into()),
            },
        );
        assert_eq!(req.accion, PatientAction::Upsert);
        assert_eq!(req.patient.notas_evolucion.len(), 2);
    }
}
