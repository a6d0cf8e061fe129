use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PublishError;

/// Version of the input protocol understood by the receiving client.
pub const PROTOCOL_VERSION: u32 = 1;

pub const DEFAULT_CLIENT_NAME: &str = "ramp Rust example";

/// Attitude and thrust setpoint carried by every control message.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Ctrl {
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
    pub thrust: f64,
}

/// One input command as pushed to the receiver.
///
/// Built fresh for every send and discarded afterwards. The text form produced
/// by [`ControlMessage::encode`] is what goes on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlMessage {
    pub version: u32,
    pub client_name: String,
    pub ctrl: Ctrl,
}

impl ControlMessage {
    /// Level attitude with the given thrust.
    pub fn thrust(client_name: &str, thrust: f64) -> Self {
        Self {
            version: PROTOCOL_VERSION,
            client_name: client_name.to_owned(),
            ctrl: Ctrl {
                thrust,
                ..Ctrl::default()
            },
        }
    }

    /// Zero thrust, used both to unlock the receiver and to disarm after a ramp.
    pub fn disarm(client_name: &str) -> Self {
        Self::thrust(client_name, 0.0)
    }

    /// Renders the wire text. Thrust always carries six fractional digits.
    pub fn encode(&self) -> String {
        // Value's Display escapes the name as a JSON string literal
        let client_name = serde_json::Value::from(self.client_name.as_str());
        format!(
            "{{\"version\": {}, \"client_name\": {}, \"ctrl\": {{\"roll\": {:?}, \"pitch\": {:?}, \"yaw\": {:?}, \"thrust\": {:.6}}}}}",
            self.version,
            client_name,
            self.ctrl.roll,
            self.ctrl.pitch,
            self.ctrl.yaw,
            self.ctrl.thrust,
        )
    }
}

impl fmt::Display for ControlMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for ControlMessage {
    type Err = PublishError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(serde_json::from_str(s)?)
    }
}
