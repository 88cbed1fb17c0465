mod avatar;
mod camera;
mod input;
mod network;
mod protocol;
mod render;
mod state;

use macroquad::experimental::coroutines::{start_coroutine, Coroutine};
use macroquad::prelude::*;

use avatar::AvatarStore;
use input::{HeldKeys, MoveCommand, MoveTracker};
use network::{NetEvent, NetworkState};
use protocol::{ClientMessage, ServerMessage};
use state::GameState;

/// Fixed identity sent in the join message; the server assigns everything else.
const USERNAME: &str = "Pat";
/// Background world image, served next to the page.
const WORLD_IMAGE: &str = "world.jpg";

struct Game {
    state: GameState,
    avatars: AvatarStore,
    net: NetworkState,
    tracker: MoveTracker,
    world: Option<Texture2D>,
    world_load: Option<Coroutine<Result<Texture2D, macroquad::Error>>>,
}

impl Game {
    fn new() -> Self {
        Game {
            state: GameState::new(),
            avatars: AvatarStore::new(),
            net: NetworkState::new(),
            tracker: MoveTracker::new(),
            world: None,
            world_load: Some(start_coroutine(async { load_texture(WORLD_IMAGE).await })),
        }
    }

    fn handle_input(&mut self) {
        let held = HeldKeys {
            up: is_key_down(KeyCode::Up),
            down: is_key_down(KeyCode::Down),
            left: is_key_down(KeyCode::Left),
            right: is_key_down(KeyCode::Right),
        };

        // Keys keep being tracked while disconnected, but nothing is sent and
        // the throttle clock only advances on actual sends.
        if self.net.connected {
            match self.tracker.tick(held, get_time()) {
                Some(MoveCommand::Move(direction)) => {
                    self.net.send(&ClientMessage::Move { direction });
                }
                Some(MoveCommand::Stop) => self.net.send(&ClientMessage::Stop),
                None => {}
            }
        }

        // One plant per key press; macroquad reports state transitions, so
        // OS key auto-repeat never retriggers this.
        if is_key_pressed(KeyCode::F) {
            if let Some(me) = self.state.local_player() {
                self.net.send(&ClientMessage::PlantFlag { x: me.x, y: me.y });
            }
        }
    }

    fn update(&mut self) {
        for event in self.net.poll_events() {
            match event {
                NetEvent::Opened => {
                    self.net.connected = true;
                    info!("channel open, joining as {}", USERNAME);
                    self.net.send(&ClientMessage::JoinGame {
                        username: USERNAME.to_string(),
                    });
                }
                NetEvent::Closed => {
                    // No reconnect; sends stay guarded off until page reload.
                    self.net.connected = false;
                    info!("channel closed");
                }
                NetEvent::Message(text) => match serde_json::from_str::<ServerMessage>(&text) {
                    Ok(msg) => self.state.apply(msg, &mut self.avatars),
                    // Best effort: unreadable frames are dropped, delivery
                    // itself is reliable.
                    Err(err) => warn!("dropping unreadable message: {}", err),
                },
            }
        }

        if let Some(load) = &mut self.world_load {
            if let Some(result) = load.retrieve() {
                self.world_load = None;
                match result {
                    Ok(tex) => self.world = Some(tex),
                    Err(err) => error!("world image failed to load: {:?}", err),
                }
            }
        }

        self.avatars.poll();
    }

    fn draw(&self) {
        let Some(world) = &self.world else {
            // Nothing to show yet; the loop keeps running so drawing starts
            // the moment the world image lands.
            clear_background(BLACK);
            return;
        };

        let cam = camera::offset(
            self.state.local_player().map(|p| (p.x, p.y)),
            (screen_width(), screen_height()),
            Some((world.width(), world.height())),
        );

        render::draw_world(world, cam);

        for flag in &self.state.flags {
            render::draw_planted_flag(flag, cam);
        }

        // Draw order across players is unspecified; only label overlap
        // depends on it.
        let my_id = self.state.my_id.as_deref();
        for player in self.state.roster.values() {
            let is_local = my_id == Some(player.id.as_str());
            render::draw_player(player, &self.avatars, cam, is_local, self.state.has_flag);
        }
    }
}

fn window_conf() -> Conf {
    Conf {
        window_title: "MMORPG Client".to_string(),
        window_width: 1280,
        window_height: 720,
        high_dpi: true,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    let mut game = Game::new();
    loop {
        game.handle_input();
        game.update();
        game.draw();
        next_frame().await;
    }
}
