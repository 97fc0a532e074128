//! Inbound envelope decoding and outbound message builders.
//!
//! Decoding is fully structural: either a complete [`Envelope`] comes back
//! or `KaiError::Malformed` does. There are no partial successes and no
//! panics on hostile input.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{KaiError, Result};

/// Server-reported failure payload (`success:false`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiError {
    #[serde(rename = "errorCode")]
    pub code: i64,
    #[serde(rename = "error")]
    pub name: String,
    pub message: String,
}

/// One entry of a `connectedKais` list.
#[derive(Debug, Clone, Deserialize)]
pub struct KaiEntry {
    #[serde(rename = "kaiId")]
    pub kai_id: i64,
    /// "left" / "right"; unrecognized strings fall back to Left downstream.
    pub hand: String,
    #[serde(rename = "defaultKai", default)]
    pub default_kai: bool,
    #[serde(rename = "defaultLeftKai", default)]
    pub default_left_kai: bool,
    #[serde(rename = "defaultRightKai", default)]
    pub default_right_kai: bool,
}

/// Body of an `incomingData` envelope. Fragments stay as raw JSON so one
/// malformed fragment cannot take its siblings down with it.
#[derive(Debug, Clone, Deserialize)]
pub struct IncomingData {
    #[serde(rename = "foregroundProcess")]
    pub foreground_process: String,
    #[serde(rename = "kaiId")]
    pub kai_id: i64,
    #[serde(rename = "defaultKai")]
    pub default_kai: bool,
    #[serde(rename = "defaultLeftKai")]
    pub default_left_kai: bool,
    #[serde(rename = "defaultRightKai")]
    pub default_right_kai: bool,
    pub data: Vec<Value>,
}

/// One decoded inbound message, classified by `success` and `type`.
#[derive(Debug, Clone)]
pub enum Envelope {
    /// `success:false`. Short-circuits everything else.
    Error(ApiError),
    Authentication {
        authenticated: bool,
    },
    ConnectedKais {
        kais: Vec<KaiEntry>,
    },
    /// The raw object rides along because unknown fragment tags surface it
    /// to the unknown-data sink.
    IncomingData {
        data: IncomingData,
        raw: Value,
    },
    /// Well-formed envelope with an unrecognized `type` tag.
    Unknown {
        tag: String,
        raw: Value,
    },
}

fn malformed(raw: &str) -> KaiError {
    tracing::warn!(raw, "malformed envelope");
    KaiError::Malformed(raw.to_string())
}

/// Decode one raw transport message into a typed envelope.
///
/// Missing `success`, non-object input, or a broken type-specific body all
/// come back as `Malformed` carrying the original raw input.
pub fn decode_envelope(raw: &str) -> Result<Envelope> {
    let value: Value = serde_json::from_str(raw).map_err(|_| malformed(raw))?;
    let obj = value.as_object().ok_or_else(|| malformed(raw))?;

    let success = obj
        .get("success")
        .and_then(Value::as_bool)
        .ok_or_else(|| malformed(raw))?;

    if !success {
        let err = ApiError::deserialize(&value).map_err(|_| malformed(raw))?;
        return Ok(Envelope::Error(err));
    }

    let tag = obj
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed(raw))?;

    match tag {
        "authentication" => {
            #[derive(Deserialize)]
            struct AuthWire {
                authenticated: bool,
            }
            let wire = AuthWire::deserialize(&value).map_err(|_| malformed(raw))?;
            Ok(Envelope::Authentication {
                authenticated: wire.authenticated,
            })
        }
        "connectedKais" => {
            #[derive(Deserialize)]
            struct KaisWire {
                kais: Vec<KaiEntry>,
            }
            let wire = KaisWire::deserialize(&value).map_err(|_| malformed(raw))?;
            Ok(Envelope::ConnectedKais { kais: wire.kais })
        }
        "incomingData" => {
            let data = IncomingData::deserialize(&value).map_err(|_| malformed(raw))?;
            Ok(Envelope::IncomingData { data, raw: value })
        }
        _ => Ok(Envelope::Unknown {
            tag: tag.to_string(),
            raw: value,
        }),
    }
}

/// Build the outbound authentication message.
pub fn auth_message(module_id: &str, module_secret: &str) -> String {
    json!({
        "type": "authentication",
        "moduleId": module_id,
        "moduleSecret": module_secret,
    })
    .to_string()
}
