// SPDX-FileCopyrightText: 2026 Scribe Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire frames exchanged with the gateway.
//!
//! One frame is one JSON object over the persistent connection, tagged by
//! its `type` field:
//!
//! ```json
//! {"type":"connect","nonce":"<hex>","signature":"<hex hmac-sha256>"}
//! {"type":"connected"}
//! {"type":"req","id":1,"method":"channel.add","params":{"username":"news"}}
//! {"type":"res","id":1,"ok":true,"payload":{"username":"news","added":true}}
//! ```

use serde::{Deserialize, Serialize};

/// One complete JSON unit on the control channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Frame {
    /// Handshake opener, sent once per connection attempt.
    Connect { nonce: String, signature: String },
    /// Handshake acknowledgement; any other reply is a rejection.
    Connected,
    /// A request, correlated by a caller-chosen monotonically increasing id.
    Req {
        id: i64,
        method: String,
        #[serde(default)]
        params: serde_json::Value,
    },
    /// A response echoing the request id it answers.
    Res {
        id: i64,
        ok: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payload: Option<serde_json::Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
}

impl Frame {
    /// A response carrying a payload. `ok` mirrors whatever the underlying
    /// operation reported; `ok = false` with a payload means "no effect",
    /// not an error.
    pub fn response(id: i64, ok: bool, payload: serde_json::Value) -> Self {
        Frame::Res {
            id,
            ok,
            payload: Some(payload),
            error: None,
        }
    }

    /// An error response.
    pub fn error_response(id: i64, error: impl Into<String>) -> Self {
        Frame::Res {
            id,
            ok: false,
            payload: None,
            error: Some(error.into()),
        }
    }
}
