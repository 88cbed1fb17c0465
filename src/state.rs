use std::collections::HashMap;

use macroquad::logging::{info, warn};

use crate::avatar::AvatarStore;
use crate::protocol::{Flag, Player, ServerMessage};

/// All server-mirrored game state. The server is authoritative; this is a
/// best-effort mirror updated one message at a time, in arrival order.
pub struct GameState {
    /// Player id → player, replaced wholesale by the join snapshot and
    /// patched by roster deltas afterwards.
    pub roster: HashMap<String, Player>,
    /// Planted flags. Append or replace only; nothing ever removes a single
    /// flag because the server never broadcasts a removal.
    pub flags: Vec<Flag>,
    pub my_id: Option<String>,
    /// Whether the local player is carrying a flag.
    pub has_flag: bool,
    // Tracked like the original client; nothing in the live path branches
    // on it yet.
    #[allow(dead_code)]
    pub join_complete: bool,
}

impl GameState {
    pub fn new() -> Self {
        GameState {
            roster: HashMap::new(),
            flags: Vec::new(),
            my_id: None,
            has_flag: false,
            join_complete: false,
        }
    }

    /// The authoritative entry for the local player, when known. Always read
    /// through the roster so deltas are never applied to a stale copy.
    pub fn local_player(&self) -> Option<&Player> {
        self.roster.get(self.my_id.as_deref()?)
    }

    /// Apply one decoded server message. This is the only mutation path for
    /// roster and flag state; messages arrive already serialized with the
    /// render loop, so no locking is involved.
    pub fn apply(&mut self, msg: ServerMessage, avatars: &mut AvatarStore) {
        match msg {
            ServerMessage::JoinGame {
                success,
                player_id,
                players,
                avatars: avatar_defs,
            } => {
                if !success {
                    // Retry/backoff is out of scope; the client just stays idle.
                    warn!("join rejected by server");
                    return;
                }
                self.my_id = player_id;
                self.roster = players;
                let my_avatar = self
                    .local_player()
                    .and_then(|p| p.avatar.clone());
                for (name, payload) in &avatar_defs {
                    let priority = my_avatar.as_deref() == Some(name.as_str());
                    avatars.register(name, payload, priority);
                }
                self.join_complete = true;
                info!(
                    "joined as {} ({} players known)",
                    self.my_id.as_deref().unwrap_or("?"),
                    self.roster.len()
                );
            }
            ServerMessage::PlayersMoved { players } => {
                for (id, delta) in players {
                    // Deltas for ids we have never seen are dropped; the
                    // join snapshot or a player_joined must come first.
                    if let Some(player) = self.roster.get_mut(&id) {
                        player.merge(delta);
                    }
                }
            }
            ServerMessage::PlayerJoined { player, avatar } => {
                if let Some(payload) = avatar {
                    avatars.register(&payload.name, &payload, false);
                }
                self.roster.insert(player.id.clone(), player);
            }
            ServerMessage::PlayerLeft { player_id } => {
                // Absent id is a no-op, not an error.
                self.roster.remove(&player_id);
            }
            ServerMessage::FlagPlanted { flag } => {
                self.flags.push(flag);
            }
            ServerMessage::FlagsUpdate { flags } => {
                self.flags = flags;
            }
            ServerMessage::FlagPickedUp { player_id } => {
                if self.my_id.as_deref() == Some(player_id.as_str()) {
                    self.has_flag = true;
                }
            }
            ServerMessage::FlagDropped { player_id } => {
                if self.my_id.as_deref() == Some(player_id.as_str()) {
                    self.has_flag = false;
                }
            }
        }
    }
}
