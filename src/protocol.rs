//! Messages of the progress delegation protocol.
//!
//! The initiator drives a session with [`ClientMessage`]s; the renderer owns
//! the widget and answers with a single [`ServerMessage::Ended`] when the
//! session is over. On the wire every message is one line of JSON tagged with
//! `"kind"`.

use crate::error::Result;
use crate::progress::Progress;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClientMessage {
    Create { id: String },
    SetCurrent { id: String, value: u64 },
    SetTotal { id: String, value: u64, approximate: bool },
    SetTitle { id: String, text: String },
    SetText { id: String, text: String },
    SetApproximateEta { id: String, eta: Duration },
    PushText { id: String, text: String },
    PopText { id: String, text: String },
    Tick { id: String },
    End { id: String },
    Pause { id: String },
    Resume { id: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ServerMessage {
    Ended { id: String },
}

impl ClientMessage {
    pub fn id(&self) -> &str {
        match self {
            ClientMessage::Create { id }
            | ClientMessage::SetCurrent { id, .. }
            | ClientMessage::SetTotal { id, .. }
            | ClientMessage::SetTitle { id, .. }
            | ClientMessage::SetText { id, .. }
            | ClientMessage::SetApproximateEta { id, .. }
            | ClientMessage::PushText { id, .. }
            | ClientMessage::PopText { id, .. }
            | ClientMessage::Tick { id }
            | ClientMessage::End { id }
            | ClientMessage::Pause { id }
            | ClientMessage::Resume { id } => id,
        }
    }

    /// Forwards the payload to the matching widget operation. `Create` has
    /// no payload and is handled by the renderer itself.
    pub fn apply(&self, widget: &dyn Progress) {
        match self {
            ClientMessage::Create { .. } => {}
            ClientMessage::SetCurrent { value, .. } => widget.set_current(*value),
            ClientMessage::SetTotal {
                value, approximate, ..
            } => widget.set_total(*value, *approximate),
            ClientMessage::SetTitle { text, .. } => widget.set_title(text),
            ClientMessage::SetText { text, .. } => widget.set_text(text),
            ClientMessage::SetApproximateEta { eta, .. } => widget.set_approximate_eta(*eta),
            ClientMessage::PushText { text, .. } => widget.push_text(text),
            ClientMessage::PopText { text, .. } => widget.pop_text(text),
            ClientMessage::Tick { .. } => widget.tick(),
            ClientMessage::End { .. } => widget.end(),
            ClientMessage::Pause { .. } => widget.pause(),
            ClientMessage::Resume { .. } => widget.resume(),
        }
    }
}

/// One message as a newline terminated JSON line.
pub fn encode_line<T: Serialize>(message: &T) -> Result<String> {
    let mut line = serde_json::to_string(message)?;
    line.push('\n');
    Ok(line)
}

pub fn decode_client_line(line: &str) -> Result<ClientMessage> {
    Ok(serde_json::from_str(line.trim_end())?)
}

pub fn decode_server_line(line: &str) -> Result<ServerMessage> {
    Ok(serde_json::from_str(line.trim_end())?)
}
