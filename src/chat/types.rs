use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    pub id: i64,
    pub team: i64,
    pub nombre: String,
    #[serde(default)]
    pub descripcion: Option<String>,
    #[serde(default)]
    pub is_private: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub channel: i64,
    pub contenido: String,
    #[serde(default)]
    pub sender_username: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewChannel {
    pub team: i64,
    pub nombre: String,
    pub descripcion: String,
    pub is_private: bool,
}

impl NewChannel {
    /// Default channel a team gets the first time anyone opens its chat.
    pub fn default_for_team(team: i64) -> Self {
        Self {
            team,
            nombre: "General".to_string(),
            descripcion: "Canal general del equipo".to_string(),
            is_private: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewMessage {
    pub channel: i64,
    pub contenido: String,
}
