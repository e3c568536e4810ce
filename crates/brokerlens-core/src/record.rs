//! Broker record types: raw rows as delivered upstream and their canonical form.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::RecordError;
use crate::value;

/// Scalar broker attributes, shared verbatim by raw and canonical records.
///
/// Decoding is lenient: the upstream store returns `numeric` columns as
/// strings and leaves most text columns nullable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrokerInfo {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub id: i64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub code: String,
    /// Display name.
    #[serde(rename = "broker", default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub logo: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub total_score: f64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub official_link: String,
    /// Free-text license description, e.g. "FCA Regulated, ASIC Regulated".
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub license_info: Option<String>,
    /// Opaque account-type payload, passed through untouched.
    #[serde(default)]
    pub account_info: Option<Value>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub register_country: Option<String>,
    /// Free-text operating period, e.g. "15-20 years".
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub operating_period: Option<String>,
}

/// A broker row before normalisation.
///
/// Each rich field is absent, a string holding JSON, or an already-parsed
/// value of unknown shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawBrokerRecord {
    #[serde(flatten)]
    pub info: BrokerInfo,
    #[serde(rename = "whychose", default)]
    pub why_choose: Option<Value>,
    #[serde(default)]
    pub safe: Option<Value>,
    #[serde(rename = "pros", default)]
    pub pros_cons: Option<Value>,
    #[serde(default)]
    pub faq: Option<Value>,
}

impl RawBrokerRecord {
    /// Decode a single record from a JSON object.
    pub fn from_json(json: &str) -> Result<Self, RecordError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Decode a JSON array of records.
    pub fn parse_records(json: &str) -> Result<Vec<Self>, RecordError> {
        match serde_json::from_str::<Value>(json)? {
            Value::Array(items) => items
                .into_iter()
                .map(|item| serde_json::from_value(item).map_err(RecordError::from))
                .collect(),
            _ => Err(RecordError::NotAnArray),
        }
    }
}

/// A broker row after normalisation. Every `Some` rich field is shape-conformant;
/// `None` means no usable data was found.
///
/// Serialises with the same wire names [`RawBrokerRecord`] reads, so the
/// output of normalisation is itself a valid raw record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrokerRecord {
    #[serde(flatten)]
    pub info: BrokerInfo,
    #[serde(rename = "whychose")]
    pub why_choose: Option<Vec<WhyChoose>>,
    pub safe: Option<SafetyInfo>,
    #[serde(rename = "pros")]
    pub pros_cons: Option<ProsAndCons>,
    pub faq: Option<Vec<Faq>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhyChoose {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyInfo {
    pub is_safe: bool,
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProsAndCons {
    pub pros: Vec<String>,
    pub cons: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faq {
    pub question: String,
    pub answer: String,
}

// ── Lenient scalar decoding ──

fn lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;
    Ok(match &v {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
            .unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;
    let score = match &v {
        Value::Number(_) | Value::String(_) => value::as_number(&v),
        _ => None,
    };
    Ok(score.filter(|f| f.is_finite()).unwrap_or(0.0))
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;
    Ok(value::text(&v))
}

fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;
    Ok(match v {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(value::text(&other)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn raw_record_decodes_database_row() {
        let json = r#"{
            "id": 7,
            "code": "icm",
            "broker": "IC Markets Global",
            "logo": "/logos/icm.png",
            "total_score": "8.75",
            "official_link": "https://example.invalid/icm",
            "license_info": "ASIC Regulated, CYSEC Regulated",
            "account_info": null,
            "register_country": "Australia",
            "operating_period": "15-20 years",
            "whychose": "{\"part2\": [\"Low spreads\"]}",
            "safe": {"is_safe": true, "reasons": ["Segregated funds"]},
            "pros": null
        }"#;
        let raw = RawBrokerRecord::from_json(json).unwrap();
        assert_eq!(raw.info.id, 7);
        assert_eq!(raw.info.name, "IC Markets Global");
        assert_eq!(raw.info.total_score, 8.75);
        assert_eq!(raw.info.operating_period.as_deref(), Some("15-20 years"));
        assert_eq!(raw.why_choose, Some(json!("{\"part2\": [\"Low spreads\"]}")));
        assert!(raw.safe.as_ref().is_some_and(Value::is_object));
        assert!(raw.pros_cons.is_none());
        assert!(raw.faq.is_none());
    }

    #[test]
    fn missing_and_null_scalars_take_defaults() {
        let raw = RawBrokerRecord::from_json(r#"{"broker": "Bare", "total_score": null}"#).unwrap();
        assert_eq!(raw.info.name, "Bare");
        assert_eq!(raw.info.total_score, 0.0);
        assert_eq!(raw.info.code, "");
        assert!(raw.info.license_info.is_none());
    }

    #[test]
    fn malformed_score_decodes_to_zero() {
        let raw = RawBrokerRecord::from_json(r#"{"total_score": "NaN", "id": "12"}"#).unwrap();
        assert_eq!(raw.info.total_score, 0.0);
        assert_eq!(raw.info.id, 12);
    }

    #[test]
    fn numeric_text_columns_are_stringified() {
        let raw = RawBrokerRecord::from_json(r#"{"code": 42, "license_info": 5}"#).unwrap();
        assert_eq!(raw.info.code, "42");
        assert_eq!(raw.info.license_info.as_deref(), Some("5"));
    }

    #[test]
    fn parse_records_requires_array() {
        let records = RawBrokerRecord::parse_records(r#"[{"code": "a"}, {"code": "b"}]"#).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].info.code, "b");

        let err = RawBrokerRecord::parse_records(r#"{"code": "a"}"#).unwrap_err();
        assert!(matches!(err, RecordError::NotAnArray));
        assert!(matches!(
            RawBrokerRecord::parse_records("not json"),
            Err(RecordError::Json(_))
        ));
    }

    #[test]
    fn canonical_record_uses_wire_names() {
        let record = BrokerRecord {
            info: BrokerInfo {
                code: "x".into(),
                name: "X Broker".into(),
                ..Default::default()
            },
            safe: Some(SafetyInfo {
                is_safe: false,
                reasons: vec!["Offshore".into()],
            }),
            ..Default::default()
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["broker"], "X Broker");
        assert_eq!(json["safe"]["is_safe"], false);
        assert!(json["whychose"].is_null());
        assert!(json["pros"].is_null());
        assert!(json["faq"].is_null());
    }
}
