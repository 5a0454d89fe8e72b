// SPDX-FileCopyrightText: 2026 Scribe Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command dispatch for inbound `req` frames.
//!
//! The method table mutates the channel registry; `ok` mirrors the
//! registry's effect flag, so re-adding an existing channel answers
//! `ok: false` with a payload rather than an error. Only malformed
//! params and unknown methods produce error responses.

use serde_json::json;
use tracing::{error, info};

use scribe_registry::ChannelRegistry;

use crate::client::GatewayClient;
use crate::frames::Frame;

/// Resolve one command against the registry and build its response.
///
/// Total: every (method, params) combination maps to exactly one
/// response frame echoing `id`.
pub fn dispatch(
    id: i64,
    method: &str,
    params: &serde_json::Value,
    registry: &ChannelRegistry,
) -> Frame {
    match method {
        "channel.add" => match username_param(params) {
            Some(username) => {
                let added = registry.add(username);
                Frame::response(id, added, json!({"username": username, "added": added}))
            }
            None => Frame::error_response(id, "Missing 'username' parameter"),
        },
        "channel.remove" => match username_param(params) {
            Some(username) => {
                let removed = registry.remove(username);
                Frame::response(id, removed, json!({"username": username, "removed": removed}))
            }
            None => Frame::error_response(id, "Missing 'username' parameter"),
        },
        "bot.enable" => {
            let changed = registry.enable();
            Frame::response(id, changed, json!({"enabled": true}))
        }
        "bot.disable" => {
            let changed = registry.disable();
            Frame::response(id, changed, json!({"enabled": false}))
        }
        other => Frame::error_response(id, format!("Unknown method: {other}")),
    }
}

/// A username param must be a non-empty string; anything else counts
/// as missing.
fn username_param(params: &serde_json::Value) -> Option<&str> {
    params
        .get("username")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
}

/// Handle one inbound frame from the listen loop.
///
/// Commands are dispatched and answered through `gateway` when one is
/// supplied; the response is returned either way so callers can observe
/// it. Non-request frames are ignored. This function never raises: the
/// listen loop must survive any command.
pub async fn handle_command(
    frame: Frame,
    registry: &ChannelRegistry,
    gateway: Option<&GatewayClient>,
) -> Option<Frame> {
    let Frame::Req { id, method, params } = frame else {
        return None;
    };
    info!(%method, %params, "received command");

    let response = dispatch(id, &method, &params, registry);
    if let Frame::Res {
        error: Some(error), ..
    } = &response
    {
        error!(%method, %error, "command failed");
    }

    if let Some(gateway) = gateway {
        // Best effort: a send failure is already logged by the client.
        gateway.send_raw(&response).await;
    }
    Some(response)
}
