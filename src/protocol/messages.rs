use serde::{Deserialize, Serialize};

// Wire protocol: single-character JSON keys to keep per-tick payloads small.
// All coordinates are rounded to one decimal place before they cross this
// boundary.
//
//   Client → Server:
//     {"t":"j","n":"Name"}        join
//     {"t":"r","n":"Name"}        respawn
//     {"t":"i","a":1.57,"b":1}    input (a = angle radians, b = boost 0/1)
//   Server → Client:
//     {"t":"w","i":id,"r":10500,"c":"#color"}          welcome
//     {"t":"s","s":[...],"f":[...],"l":[...],"m":[...]} state
//     {"t":"d","k":"Killer","p":42}                     death
//     {"t":"e","m":"..."}                               error

// ── Client → Server ──

#[derive(Debug, Deserialize)]
#[serde(tag = "t")]
pub enum ClientMessage {
    #[serde(rename = "j")]
    Join {
        #[serde(rename = "n", default)]
        name: String,
    },
    #[serde(rename = "r")]
    Respawn {
        #[serde(rename = "n", default)]
        name: String,
    },
    #[serde(rename = "i")]
    Input {
        #[serde(rename = "a", default)]
        angle: f64,
        #[serde(rename = "b", default)]
        boost: u8,
    },
}

// ── Server → Client ──

#[derive(Debug, Serialize, Clone)]
#[serde(tag = "t")]
pub enum ServerMessage {
    #[serde(rename = "w")]
    Welcome {
        #[serde(rename = "i")]
        id: u64,
        #[serde(rename = "r")]
        world_radius: f64,
        #[serde(rename = "c")]
        color: String,
    },
    #[serde(rename = "s")]
    State {
        #[serde(rename = "s")]
        snakes: Vec<SnakeDto>,
        #[serde(rename = "f")]
        food: Vec<FoodDto>,
        #[serde(rename = "l")]
        leaderboard: Vec<LeaderboardEntry>,
        #[serde(rename = "m", skip_serializing_if = "Vec::is_empty")]
        minimap: Vec<MinimapTrace>,
    },
    #[serde(rename = "d")]
    Death {
        #[serde(rename = "k")]
        killer: String,
        #[serde(rename = "p")]
        score: u32,
    },
    #[serde(rename = "e")]
    Error {
        #[serde(rename = "m")]
        message: String,
    },
}

/// Snake on the wire. Segments are flat [x, y] pairs; head first.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SnakeDto {
    #[serde(rename = "i")]
    pub id: u64,
    #[serde(rename = "n")]
    pub name: String,
    #[serde(rename = "s")]
    pub segments: Vec<[f64; 2]>,
    #[serde(rename = "c")]
    pub color: String,
    #[serde(rename = "p")]
    pub score: u32,
    #[serde(rename = "b", default, skip_serializing_if = "is_zero")]
    pub boosting: u8,
    #[serde(rename = "w")]
    pub width: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FoodDto {
    #[serde(rename = "i")]
    pub id: u64,
    #[serde(rename = "x")]
    pub x: f64,
    #[serde(rename = "y")]
    pub y: f64,
    #[serde(rename = "v")]
    pub value: u32,
    #[serde(rename = "c")]
    pub color: String,
    #[serde(rename = "l")]
    pub level: u32,
    #[serde(rename = "m")]
    pub moving: u8,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LeaderboardEntry {
    #[serde(rename = "i")]
    pub id: u64,
    #[serde(rename = "n")]
    pub name: String,
    #[serde(rename = "p")]
    pub score: u32,
}

/// Downsampled snake body for the minimap.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MinimapTrace {
    #[serde(rename = "s")]
    pub segments: Vec<[f64; 2]>,
    #[serde(rename = "c")]
    pub color: String,
    #[serde(rename = "w")]
    pub width: f64,
}

fn is_zero(v: &u8) -> bool {
    *v == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_messages_parse_compact_keys() {
        let join: ClientMessage = serde_json::from_str(r#"{"t":"j","n":"Ada"}"#).unwrap();
        assert!(matches!(join, ClientMessage::Join { name } if name == "Ada"));

        let input: ClientMessage =
            serde_json::from_str(r#"{"t":"i","a":1.5,"b":1}"#).unwrap();
        match input {
            ClientMessage::Input { angle, boost } => {
                assert_eq!(angle, 1.5);
                assert_eq!(boost, 1);
            }
            other => panic!("unexpected message: {other:?}"),
        }

        // Missing optional fields default
        let bare: ClientMessage = serde_json::from_str(r#"{"t":"i"}"#).unwrap();
        assert!(matches!(bare, ClientMessage::Input { angle, boost } if angle == 0.0 && boost == 0));
    }

    #[test]
    fn state_message_uses_single_char_tags() {
        let msg = ServerMessage::Welcome {
            id: 7,
            world_radius: 10500.0,
            color: "#e74c3c".into(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""t":"w""#));
        assert!(json.contains(r#""i":7"#));
        assert!(json.contains(r#""r":10500.0"#));
    }

    #[test]
    fn boost_flag_is_omitted_when_not_boosting() {
        let dto = SnakeDto {
            id: 1,
            name: "x".into(),
            segments: vec![[1.0, 2.0]],
            color: "#fff".into(),
            score: 10,
            boosting: 0,
            width: 10.0,
        };
        let json = serde_json::to_string(&dto).unwrap();
        assert!(!json.contains(r#""b""#));

        let boosted = SnakeDto { boosting: 1, ..dto };
        let json = serde_json::to_string(&boosted).unwrap();
        assert!(json.contains(r#""b":1"#));
    }

    #[test]
    fn empty_minimap_is_omitted_from_state() {
        let msg = ServerMessage::State {
            snakes: vec![],
            food: vec![],
            leaderboard: vec![],
            minimap: vec![],
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(!json.contains(r#""m""#));
    }
}
