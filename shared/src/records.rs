//! 后端业务记录
//!
//! 后端返回的字段并不稳定（数字与字符串混用、字段缺失），
//! 所有记录都以宽松方式反序列化：可选字段给默认值，未知字段保留在 `extra` 中。

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// 接受字符串、数字或 null 形式的标识符
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// 接受数字或数字字符串，其余情况视为缺失
fn lenient_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

// =========================================================
// 预约 (Citas)
// =========================================================

/// 预约表单中可编辑的字段
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppointmentDraft {
    #[serde(default, alias = "nombre", alias = "patient_name")]
    pub paciente: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub telefono: String,
    #[serde(default)]
    pub fecha: String,
    #[serde(default)]
    pub hora: String,
    #[serde(default)]
    pub motivo: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(flatten)]
    pub draft: AppointmentDraft,
    #[serde(default)]
    pub estado: String,
}

// =========================================================
// 患者 (Pacientes)
// =========================================================

/// 演进记录（每次咨询追加一条）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClinicalNote {
    #[serde(default)]
    pub fecha: String,
    #[serde(default)]
    pub contenido: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autor: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub nombre: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub telefono: String,
    #[serde(
        default,
        deserialize_with = "lenient_u32",
        skip_serializing_if = "Option::is_none"
    )]
    pub edad: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notas: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notas_evolucion: Vec<ClinicalNote>,
    /// 后端附带的其他字段，更新时原样回传
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// =========================================================
// 统计 (Dashboard)
// =========================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    #[serde(default)]
    pub total_pacientes: Option<u64>,
    #[serde(default)]
    pub total_citas: Option<u64>,
    #[serde(default)]
    pub citas_pendientes: Option<u64>,
    #[serde(default)]
    pub conversaciones: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DashboardStats {
    /// 未被具名字段覆盖的数值型计数器
    pub fn extra_counters(&self) -> Vec<(String, f64)> {
        self.extra
            .iter()
            .filter_map(|(k, v)| v.as_f64().map(|n| (k.clone(), n)))
            .collect()
    }
}

/// 聊天机器人生成的对话报告
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationSummary {
    #[serde(default, deserialize_with = "string_or_number")]
    pub user_id: String,
    #[serde(default)]
    pub fecha: String,
    #[serde(default, alias = "summary", alias = "reporte")]
    pub resumen: String,
}

// =========================================================
// 写操作的通用回执
// =========================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AckDetail {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default, alias = "mensaje")]
    pub message: Option<String>,
    #[serde(default)]
    pub id: Option<Value>,
}

/// 写接口的回执：有的返回 JSON 对象，有的只返回一段文本
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Ack {
    Detail(AckDetail),
    Text(String),
}

impl Ack {
    /// 适合直接展示给用户的提示
    pub fn message(&self) -> Option<&str> {
        match self {
            Ack::Detail(d) => d.message.as_deref(),
            Ack::Text(t) if !t.trim().is_empty() => Some(t.as_str()),
            Ack::Text(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn appointment_accepts_numeric_id_and_aliases() {
        let cita: Appointment = serde_json::from_value(json!({
            "id": 42,
            "nombre": "Ana",
            "fecha": "2030-01-02",
            "hora": "10:00",
            "estado": "pendiente"
        }))
        .unwrap();
        assert_eq!(cita.id, "42");
        assert_eq!(cita.draft.paciente, "Ana");
        assert_eq!(cita.estado, "pendiente");
        assert!(cita.draft.motivo.is_empty());
    }

    #[test]
    fn patient_keeps_unknown_fields() {
        let p: Patient = serde_json::from_value(json!({
            "id": "p1",
            "nombre": "Luis",
            "edad": "34",
            "sigsa": "ABC"
        }))
        .unwrap();
        assert_eq!(p.edad, Some(34));
        assert_eq!(p.extra.get("sigsa"), Some(&json!("ABC")));

        let back = serde_json::to_value(&p).unwrap();
        assert_eq!(back["sigsa"], "ABC");
    }

    #[test]
    fn dashboard_extra_counters_skip_non_numbers() {
        let stats: DashboardStats = serde_json::from_value(json!({
            "total_pacientes": 3,
            "sesiones_mes": 12,
            "ultima_actualizacion": "ayer"
        }))
        .unwrap();
        assert_eq!(stats.total_pacientes, Some(3));
        assert_eq!(stats.extra_counters(), vec![("sesiones_mes".to_string(), 12.0)]);
    }

    #[test]
    fn ack_accepts_object_or_text() {
        let a: Ack = serde_json::from_value(json!({ "success": true, "mensaje": "ok" })).unwrap();
        assert_eq!(a.message(), Some("ok"));

        let t: Ack = serde_json::from_value(json!("Cita creada")).unwrap();
        assert_eq!(t.message(), Some("Cita creada"));
    }
}
