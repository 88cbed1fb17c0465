use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Movement direction as sent in `move` commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Facing direction used to pick an avatar frame sequence.
/// The server only ships frames for north/south/east; a facing with no
/// frames falls back to the placeholder like any missing sequence.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    North,
    #[default]
    South,
    East,
    West,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: String,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub facing: Facing,
    // Mirrored from the server but not consumed by drawing (yet).
    #[allow(dead_code)]
    #[serde(default)]
    pub is_moving: bool,
    #[serde(default)]
    pub animation_frame: usize,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

/// Partial player update from a `players_moved` broadcast. Fields the server
/// omitted stay `None` and leave the roster entry untouched.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerDelta {
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub facing: Option<Facing>,
    pub is_moving: Option<bool>,
    pub animation_frame: Option<usize>,
    pub username: Option<String>,
    pub avatar: Option<String>,
}

impl Player {
    /// Shallow merge: last write wins per field, absent fields are preserved.
    pub fn merge(&mut self, delta: PlayerDelta) {
        if let Some(x) = delta.x {
            self.x = x;
        }
        if let Some(y) = delta.y {
            self.y = y;
        }
        if let Some(facing) = delta.facing {
            self.facing = facing;
        }
        if let Some(is_moving) = delta.is_moving {
            self.is_moving = is_moving;
        }
        if let Some(frame) = delta.animation_frame {
            self.animation_frame = frame;
        }
        if let Some(username) = delta.username {
            self.username = username;
        }
        if let Some(avatar) = delta.avatar {
            self.avatar = Some(avatar);
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flag {
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[allow(dead_code)]
    #[serde(default)]
    pub player_id: String,
    #[serde(default)]
    pub username: String,
}

/// Avatar definition as shipped by the server: per-facing lists of image
/// sources (data URLs or fetchable paths).
#[derive(Clone, Debug, Default, Deserialize)]
pub struct AvatarPayload {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub frames: HashMap<Facing, Vec<String>>,
}

/// One decoded server → client message. Unknown `action` values or missing
/// required fields fail deserialization and the frame is dropped upstream.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ServerMessage {
    #[serde(rename_all = "camelCase")]
    JoinGame {
        #[serde(default)]
        success: bool,
        #[serde(default)]
        player_id: Option<String>,
        #[serde(default)]
        players: HashMap<String, Player>,
        #[serde(default)]
        avatars: HashMap<String, AvatarPayload>,
    },
    PlayersMoved {
        #[serde(default)]
        players: HashMap<String, PlayerDelta>,
    },
    PlayerJoined {
        player: Player,
        #[serde(default)]
        avatar: Option<AvatarPayload>,
    },
    #[serde(rename_all = "camelCase")]
    PlayerLeft { player_id: String },
    FlagPlanted { flag: Flag },
    FlagsUpdate {
        #[serde(default)]
        flags: Vec<Flag>,
    },
    #[serde(rename_all = "camelCase")]
    FlagPickedUp { player_id: String },
    #[serde(rename_all = "camelCase")]
    FlagDropped { player_id: String },
}

/// One client → server command.
#[derive(Debug, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClientMessage {
    JoinGame { username: String },
    Move { direction: Direction },
    Stop,
    PlantFlag { x: f32, y: f32 },
}
