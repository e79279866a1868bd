//! JSON envelope every reply is wrapped in.
//!
//! Successful replies look like `{"status": "success", ...payload}`, failures like
//! `{"status": "fail", "error": {"code": 204, "message": "..."}}`.

use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::warn;

use crate::errors::{Error, Result};

/// Message shown to clients for unexpected errors. The detail only goes to the log.
pub fn error_message(err: &Error, admin_email: &str) -> String {
    match err {
        Error::Unexpected { .. } => format!(
            "Unexpected error occured. This shouldn't happen, please, contact server \
             administrator at {}.",
            admin_email
        ),
        other => other.to_string(),
    }
}

/// Wrap a payload in a success envelope. Object payloads are merged into the envelope,
/// `()` and `None` add nothing, and anything else goes under `"result"`.
pub fn success<T: Serialize + ?Sized>(payload: &T) -> Result<Value> {
    let mut packet = Map::new();
    packet.insert("status".to_owned(), Value::from("success"));
    match serde_json::to_value(payload).map_err(Error::unexpected)? {
        Value::Object(fields) => packet.extend(fields),
        Value::Null => {}
        other => {
            packet.insert("result".to_owned(), other);
        }
    }
    Ok(Value::Object(packet))
}

/// Wrap an error in a failure envelope.
pub fn failure(err: &Error, admin_email: &str) -> Value {
    json!({
        "status": "fail",
        "error": {
            "code": err.code(),
            "message": error_message(err, admin_email),
        },
    })
}

/// Wrap the result of an operation in the matching envelope.
pub fn respond<T: Serialize>(result: Result<T>, admin_email: &str) -> Value {
    match result.and_then(|payload| success(&payload)) {
        Ok(packet) => packet,
        Err(err) => {
            if let Error::Unexpected { detail } = &err {
                warn!("Unexpected failure: {}", detail);
            }
            failure(&err, admin_email)
        }
    }
}
