//! 后端 API 客户端
//!
//! 在 `Gateway` 之上提供带类型的业务方法，并实现聊天相关的协作者接口。

use async_trait::async_trait;
use consultorio_shared::protocol::{
    CreateAppointmentRequest, CreateUserRequest, DashboardRequest, DeleteAppointmentRequest,
    ListAppointmentsRequest, ListPatientsRequest, MedicalRecordRequest, PatientInfoRequest,
    PatientLookup, REPORT_WRAPPER_KEYS, SigsaInfoRequest, UpdateAppointmentRequest,
    UpdatePatientRequest,
};
use consultorio_shared::{
    Ack, Appointment, AppointmentDraft, ChatTurnReply, ChatTurnRequest, ClinicalNote,
    ConversationReport, ConversationSummary, DashboardStats, Patient,
};
use leptos::prelude::*;
use serde_json::Value;

use crate::chat::reporter::{ChatBot, ConversationReporter, DispatchMode};
use crate::config::AppConfig;
use crate::error::{ClientError, ClientResult};
use crate::gateway::Gateway;
use crate::web::http::{FetchTransport, post_keepalive, send_beacon};

#[derive(Debug, Clone)]
pub struct ConsultorioApi {
    gateway: Gateway<FetchTransport>,
    config: AppConfig,
}

impl ConsultorioApi {
    pub fn new(config: AppConfig) -> Self {
        Self {
            gateway: Gateway::new(config.api_base.clone(), FetchTransport),
            config,
        }
    }

    // =========================================================
    // 账号
    // =========================================================

    pub async fn create_user(&self, request: &CreateUserRequest) -> ClientResult<Ack> {
        self.gateway.call(request).await
    }

    // =========================================================
    // 患者
    // =========================================================

    pub async fn list_patients(&self) -> ClientResult<Vec<Patient>> {
        self.gateway.list(&ListPatientsRequest).await
    }

    pub async fn upsert_patient(&self, patient: Patient) -> ClientResult<Ack> {
        self.gateway.call(&UpdatePatientRequest::upsert(patient)).await
    }

    pub async fn delete_patient(&self, id: &str) -> ClientResult<Ack> {
        self.gateway.call(&UpdatePatientRequest::delete(id)).await
    }

    pub async fn append_note(&self, patient: Patient, note: ClinicalNote) -> ClientResult<Ack> {
        self.gateway
            .call(&UpdatePatientRequest::append_note(patient, note))
            .await
    }

    pub async fn patient_info(&self, id: &str) -> ClientResult<Value> {
        self.gateway.call(&PatientInfoRequest(lookup(id))).await
    }

    pub async fn sigsa_info(&self, id: &str) -> ClientResult<Value> {
        self.gateway.call(&SigsaInfoRequest(lookup(id))).await
    }

    pub async fn medical_record(&self, id: &str) -> ClientResult<Value> {
        self.gateway.call(&MedicalRecordRequest(lookup(id))).await
    }

    // =========================================================
    // 统计
    // =========================================================

    pub async fn dashboard(&self) -> ClientResult<DashboardStats> {
        self.gateway.call(&DashboardRequest).await
    }

    pub async fn list_reports(&self) -> ClientResult<Vec<ConversationSummary>> {
        self.gateway
            .list_at(&self.config.reports_url, REPORT_WRAPPER_KEYS)
            .await
    }

    // =========================================================
    // 预约
    // =========================================================

    pub async fn list_appointments(&self) -> ClientResult<Vec<Appointment>> {
        self.gateway.list(&ListAppointmentsRequest).await
    }

    pub async fn create_appointment(&self, draft: AppointmentDraft) -> ClientResult<Ack> {
        self.gateway.call(&CreateAppointmentRequest(draft)).await
    }

    pub async fn update_appointment(&self, appointment: Appointment) -> ClientResult<Ack> {
        self.gateway
            .call(&UpdateAppointmentRequest(appointment))
            .await
    }

    pub async fn delete_appointment(&self, id: &str) -> ClientResult<Ack> {
        self.gateway
            .call(&DeleteAppointmentRequest { id: id.to_string() })
            .await
    }
}

fn lookup(id: &str) -> PatientLookup {
    PatientLookup {
        paciente_id: id.to_string(),
    }
}

// =========================================================
// 聊天协作者
// =========================================================

#[async_trait(?Send)]
impl ChatBot for ConsultorioApi {
    async fn reply(&self, turn: &ChatTurnRequest) -> ClientResult<ChatTurnReply> {
        self.gateway
            .post(&self.config.chatbot_url, turn)
            .await?
            .into_typed()
            .map_err(|e| e.in_op("chat.reply"))
    }
}

#[async_trait(?Send)]
impl ConversationReporter for ConsultorioApi {
    async fn report(&self, report: &ConversationReport) -> ClientResult<()> {
        // 响应体不关心
        self.gateway.post(&self.config.report_url, report).await?;
        Ok(())
    }

    fn dispatch(&self, report: &ConversationReport, mode: DispatchMode) {
        let body = match serde_json::to_string(report) {
            Ok(body) => body,
            Err(e) => {
                log_error!("[Chat] 无法序列化结束上报: {}", e);
                return;
            }
        };
        let url = self.gateway.url(&self.config.report_url);

        match mode {
            DispatchMode::Beacon => {
                if !send_beacon(&url, &body) {
                    log_warn!("[Chat] sendBeacon 被拒绝，改用 keep-alive");
                    post_keepalive(&url, body);
                }
            }
            DispatchMode::KeepAlive => post_keepalive(&url, body),
        }
    }
}

// =========================================================
// Context
// =========================================================

pub fn provide_api(config: AppConfig) -> ConsultorioApi {
    let api = ConsultorioApi::new(config);
    provide_context(api.clone());
    api
}

pub fn try_use_api() -> ClientResult<ConsultorioApi> {
    use_context::<ConsultorioApi>().ok_or_else(|| ClientError::context_unavailable("ConsultorioApi"))
}

/// # Panics
/// 在 `App` 之外调用时中止渲染。
pub fn use_api() -> ConsultorioApi {
    match try_use_api() {
        Ok(api) => api,
        Err(e) => panic!("{}", e),
    }
}
