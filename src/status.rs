use serde::{Deserialize, Serialize};

/// Server list payload sent in reply to a status request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub version: VersionInfo,
    pub description: String,
    pub players: PlayersInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    pub name: String,
    pub protocol: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayersInfo {
    pub max: i32,
    pub online: i32,
}

impl StatusResponse {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_shape() {
        let status = StatusResponse {
            version: VersionInfo {
                name: "1.21.3".to_string(),
                protocol: 760,
            },
            description: "Pandora \"test\"".to_string(),
            players: PlayersInfo { max: 10, online: 2 },
        };

        let value: serde_json::Value = serde_json::from_str(&status.to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "version": { "name": "1.21.3", "protocol": 760 },
                "description": "Pandora \"test\"",
                "players": { "max": 10, "online": 2 },
            })
        );
    }
}
