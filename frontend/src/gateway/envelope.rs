//! 列表响应的形状识别
//!
//! 同一类接口可能返回：
//! 1. 裸数组 `[...]`
//! 2. `{ "data": [...] }`
//! 3. 业务专用键，如 `{ "citas": [...] }`、`{ "patients": [...] }`
//!
//! 按上述固定顺序逐一尝试，全部不匹配时明确失败，不做猜测。

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ClientError, ClientResult};

#[derive(Debug, Clone, PartialEq)]
pub enum ListEnvelope {
    Bare(Vec<Value>),
    Data(Vec<Value>),
    Keyed { key: String, items: Vec<Value> },
}

impl ListEnvelope {
    pub fn detect(value: Value, wrapper_keys: &[&str]) -> ClientResult<Self> {
        let mut object = match value {
            Value::Array(items) => return Ok(ListEnvelope::Bare(items)),
            Value::Object(map) => map,
            other => {
                return Err(ClientError::unexpected_shape(format!(
                    "期望数组或对象，实际为 {}",
                    type_name(&other)
                )));
            }
        };

        if let Some(Value::Array(_)) = object.get("data") {
            if let Some(Value::Array(items)) = object.remove("data") {
                return Ok(ListEnvelope::Data(items));
            }
        }

        for key in wrapper_keys {
            if let Some(Value::Array(_)) = object.get(*key) {
                if let Some(Value::Array(items)) = object.remove(*key) {
                    return Ok(ListEnvelope::Keyed {
                        key: key.to_string(),
                        items,
                    });
                }
            }
        }

        let mut found: Vec<&str> = object.keys().map(String::as_str).collect();
        found.sort_unstable();
        Err(ClientError::unexpected_shape(format!(
            "响应中没有可识别的列表 (期望 data/{}，实际键: {})",
            wrapper_keys.join("/"),
            found.join(", ")
        )))
    }

    pub fn items(&self) -> &[Value] {
        match self {
            ListEnvelope::Bare(items) | ListEnvelope::Data(items) => items,
            ListEnvelope::Keyed { items, .. } => items,
        }
    }

    pub fn into_items<T: DeserializeOwned>(self) -> ClientResult<Vec<T>> {
        let items = match self {
            ListEnvelope::Bare(items) | ListEnvelope::Data(items) => items,
            ListEnvelope::Keyed { items, .. } => items,
        };
        items
            .into_iter()
            .map(|v| serde_json::from_value(v).map_err(ClientError::from))
            .collect()
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientErrorKind;
    use serde_json::json;

    #[test]
    fn bare_array_wins() {
        let env = ListEnvelope::detect(json!([1, 2]), &["citas"]).unwrap();
        assert_eq!(env, ListEnvelope::Bare(vec![json!(1), json!(2)]));
    }

    #[test]
    fn data_is_checked_before_feature_keys() {
        let env = ListEnvelope::detect(json!({ "citas": [1], "data": [2] }), &["citas"]).unwrap();
        assert_eq!(env, ListEnvelope::Data(vec![json!(2)]));
    }

    #[test]
    fn feature_keys_follow_caller_order() {
        let env = ListEnvelope::detect(
            json!({ "pacientes": [1], "patients": [2] }),
            &["patients", "pacientes"],
        )
        .unwrap();
        assert_eq!(
            env,
            ListEnvelope::Keyed {
                key: "patients".into(),
                items: vec![json!(2)]
            }
        );
    }

    #[test]
    fn non_array_values_under_known_keys_do_not_match() {
        let env = ListEnvelope::detect(json!({ "data": {"x": 1}, "reportes": [] }), &["reportes"])
            .unwrap();
        assert!(matches!(env, ListEnvelope::Keyed { ref key, .. } if key == "reportes"));
        assert!(env.items().is_empty());
    }

    #[test]
    fn unknown_shape_fails_explicitly() {
        let err = ListEnvelope::detect(json!({ "rows": [] }), &["citas"]).unwrap_err();
        assert_eq!(err.kind, ClientErrorKind::UnexpectedShape);
        assert!(err.message().contains("rows"));

        let err = ListEnvelope::detect(json!("ok"), &["citas"]).unwrap_err();
        assert_eq!(err.kind, ClientErrorKind::UnexpectedShape);
    }

    #[test]
    fn items_are_decoded() {
        let env = ListEnvelope::detect(json!({ "data": [3, 4] }), &[]).unwrap();
        let items: Vec<u32> = env.into_items().unwrap();
        assert_eq!(items, vec![3, 4]);
    }
}
