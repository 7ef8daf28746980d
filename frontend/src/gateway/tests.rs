use super::*;
use crate::error::ClientErrorKind;
use consultorio_shared::protocol::{
    DashboardRequest, DeleteAppointmentRequest, ListAppointmentsRequest, ListPatientsRequest,
};
use consultorio_shared::Ack;
use serde_json::json;
use std::cell::RefCell;
use std::collections::HashMap;

// =========================================================
// Mock Transport
// =========================================================

#[derive(Default)]
struct MockTransport {
    responses: RefCell<HashMap<String, HttpResponse>>,
    requests: RefCell<Vec<HttpRequest>>,
}

impl MockTransport {
    fn respond(&self, url: &str, status: u16, content_type: Option<&str>, body: &str) {
        self.responses.borrow_mut().insert(
            url.to_string(),
            HttpResponse {
                status,
                content_type: content_type.map(str::to_string),
                body: body.to_string(),
            },
        );
    }

    fn respond_json(&self, url: &str, status: u16, body: Value) {
        self.respond(url, status, Some("application/json; charset=utf-8"), &body.to_string());
    }
}

#[async_trait(?Send)]
impl Transport for MockTransport {
    async fn send(&self, req: HttpRequest) -> ClientResult<HttpResponse> {
        let url = req.url.clone();
        self.requests.borrow_mut().push(req);
        self.responses
            .borrow()
            .get(&url)
            .cloned()
            .ok_or_else(|| ClientError::network(format!("no mock for {}", url)))
    }
}

fn gateway() -> Gateway<MockTransport> {
    Gateway::new("https://api.test/", MockTransport::default())
}

// =========================================================
// 错误消息提取
// =========================================================

#[tokio::test]
async fn not_found_uses_json_error_field() {
    let gw = gateway();
    gw.transport
        .respond_json("https://api.test/api/x", 404, json!({ "error": "not found" }));

    let err = gw.get("/api/x").await.unwrap_err();
    assert_eq!(err.kind, ClientErrorKind::Remote { status: 404 });
    assert_eq!(err.message(), "not found");
}

#[tokio::test]
async fn plain_text_error_body_is_used_verbatim() {
    let gw = gateway();
    gw.transport
        .respond("https://api.test/api/x", 500, Some("text/plain"), "boom");

    let err = gw.post("/api/x", &json!({})).await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.message(), "boom");
}

#[test]
fn error_message_priority() {
    let msg = |p: Payload| error_message(&p, 502);

    assert_eq!(msg(Payload::Json(json!({ "error": "e", "message": "m" }))), "e");
    assert_eq!(msg(Payload::Json(json!({ "message": "m" }))), "m");
    assert_eq!(
        msg(Payload::Json(json!({ "error": null, "message": "m" }))),
        "m"
    );
    assert_eq!(msg(Payload::Json(json!({ "code": 7 }))), r#"{"code":7}"#);
    assert_eq!(msg(Payload::Text("fallo".into())), "fallo");
    assert_eq!(msg(Payload::Text("   ".into())), "HTTP 502");
}

#[tokio::test]
async fn json_declared_but_invalid_falls_back_to_text() {
    let gw = gateway();
    gw.transport
        .respond("https://api.test/api/x", 400, Some("application/json"), "Bad <b>input</b>");

    let err = gw.get("/api/x").await.unwrap_err();
    assert_eq!(err.message(), "Bad <b>input</b>");
}

// =========================================================
// 成功路径
// =========================================================

#[tokio::test]
async fn success_json_is_returned_unmodified() {
    let gw = gateway();
    let body = json!({ "a": [1, 2, { "b": null }], "c": "d" });
    gw.transport
        .respond_json("https://api.test/api/x", 200, body.clone());

    assert_eq!(gw.get("/api/x").await.unwrap(), Payload::Json(body));
}

#[tokio::test]
async fn success_text_is_returned_as_text() {
    let gw = gateway();
    gw.transport
        .respond("https://api.test/api/x", 201, None, "creado");

    assert_eq!(
        gw.get("/api/x").await.unwrap(),
        Payload::Text("creado".into())
    );
}

#[tokio::test]
async fn post_sends_json_body_and_headers() {
    let gw = gateway();
    gw.transport
        .respond_json("https://api.test/api/eliminar_cita_consultorio", 200, json!({ "success": true }));

    let ack = gw
        .call(&DeleteAppointmentRequest { id: "c1".into() })
        .await
        .unwrap();
    assert!(matches!(ack, Ack::Detail(ref d) if d.success == Some(true)));

    let reqs = gw.transport.requests.borrow();
    assert_eq!(reqs.len(), 1);
    assert_eq!(reqs[0].method, HttpMethod::Post);
    assert_eq!(reqs[0].body.as_deref(), Some(r#"{"id":"c1"}"#));
    assert!(
        reqs[0]
            .headers
            .iter()
            .any(|(k, v)| k == "Content-Type" && v == "application/json")
    );
}

#[tokio::test]
async fn call_get_endpoint_has_no_body() {
    let gw = gateway();
    gw.transport.respond_json(
        "https://api.test/api/get_dashboard_data",
        200,
        json!({ "total_citas": 9 }),
    );

    let stats = gw.call(&DashboardRequest).await.unwrap();
    assert_eq!(stats.total_citas, Some(9));
    assert_eq!(gw.transport.requests.borrow()[0].body, None);
}

#[tokio::test]
async fn text_ack_on_success() {
    let gw = gateway();
    gw.transport.respond(
        "https://api.test/api/eliminar_cita_consultorio",
        200,
        Some("text/plain"),
        "Cita eliminada",
    );

    let ack = gw
        .call(&DeleteAppointmentRequest { id: "c1".into() })
        .await
        .unwrap();
    assert_eq!(ack.message(), Some("Cita eliminada"));
}

// =========================================================
// 列表形状
// =========================================================

#[tokio::test]
async fn appointments_under_citas_key() {
    let gw = gateway();
    gw.transport.respond_json(
        "https://api.test/api/listar_citas_consultorio",
        200,
        json!({ "citas": [{ "id": 1, "paciente": "Ana" }, { "id": "2", "paciente": "Luis" }] }),
    );

    let citas = gw.list(&ListAppointmentsRequest).await.unwrap();
    assert_eq!(citas.len(), 2);
    assert_eq!(citas[0].id, "1");
    assert_eq!(citas[1].draft.paciente, "Luis");
}

#[tokio::test]
async fn patients_as_bare_array() {
    let gw = gateway();
    gw.transport.respond_json(
        "https://api.test/api/listar_todos_pacientes",
        200,
        json!([{ "id": "p1", "nombre": "Ana" }]),
    );

    let patients = gw.list(&ListPatientsRequest).await.unwrap();
    assert_eq!(patients[0].nombre, "Ana");
}

#[tokio::test]
async fn unknown_wrapper_is_unexpected_shape() {
    let gw = gateway();
    gw.transport.respond_json(
        "https://api.test/api/listar_todos_pacientes",
        200,
        json!({ "rows": [] }),
    );

    let err = gw.list(&ListPatientsRequest).await.unwrap_err();
    assert_eq!(err.kind, ClientErrorKind::UnexpectedShape);
    assert_eq!(err.spans()[0].operation, "gateway.list");
}

#[tokio::test]
async fn absolute_urls_bypass_base() {
    let gw = gateway();
    gw.transport.respond_json(
        "https://bot.test/reportes",
        200,
        json!({ "reportes": [] }),
    );

    let reports: Vec<Value> = gw
        .list_at("https://bot.test/reportes", &["reportes"])
        .await
        .unwrap();
    assert!(reports.is_empty());
    assert_eq!(gw.url("api/x"), "https://api.test/api/x");
}

#[tokio::test]
async fn transport_failure_is_traced() {
    let gw = gateway();
    let err = gw.get("/api/missing").await.unwrap_err();
    assert_eq!(err.kind, ClientErrorKind::Network);
    assert_eq!(err.spans()[0].detail.as_deref(), Some("/api/missing"));
}
