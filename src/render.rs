use macroquad::prelude::*;

use crate::avatar::AvatarStore;
use crate::protocol::{Flag, Player};

/// Flags within this many pixels outside the viewport still get drawn, so a
/// half-visible flag at the edge keeps its label.
const FLAG_CULL_MARGIN: f32 = 20.0;
/// Side length of the placeholder square drawn when no avatar frame resolves.
const PLACEHOLDER_SIZE: f32 = 32.0;

const LOCAL_SQUARE: Color = Color::new(0.0, 1.0, 0.0, 1.0);
const REMOTE_SQUARE: Color = Color::new(1.0, 0.0, 0.0, 1.0);
const LOCAL_LABEL: Color = Color::new(1.0, 1.0, 0.0, 1.0);
const REMOTE_LABEL: Color = Color::new(1.0, 1.0, 1.0, 1.0);
const LABEL_OUTLINE: Color = Color::new(0.0, 0.0, 0.0, 0.8);
const FLAG_RED: Color = Color::new(1.0, 0.0, 0.0, 1.0);
const POLE_BROWN: Color = Color::new(0.545, 0.271, 0.075, 1.0);

/// Blit the visible world sub-rectangle 1:1 onto the screen, clipped to the
/// world bounds so the edge of the map is drawn without wrapping or
/// stretching.
pub fn draw_world(world: &Texture2D, cam: (f32, f32)) {
    let (cam_x, cam_y) = cam;
    let sw = screen_width().min(world.width() - cam_x);
    let sh = screen_height().min(world.height() - cam_y);

    clear_background(BLACK);
    if sw > 0.0 && sh > 0.0 {
        draw_texture_ex(
            world,
            0.0,
            0.0,
            WHITE,
            DrawTextureParams {
                source: Some(Rect::new(cam_x, cam_y, sw, sh)),
                dest_size: Some(vec2(sw, sh)),
                ..Default::default()
            },
        );
    }
}

/// Pole + banner glyph for a flag, anchored at its top-left.
pub fn draw_flag_marker(x: f32, y: f32, color: Color) {
    draw_rectangle(x, y, 2.0, 20.0, POLE_BROWN);
    draw_rectangle(x + 2.0, y, 12.0, 8.0, color);
    draw_rectangle_lines(x + 2.0, y, 12.0, 8.0, 1.0, BLACK);
}

/// Draw one planted flag with its owner label, skipping flags well outside
/// the viewport.
pub fn draw_planted_flag(flag: &Flag, cam: (f32, f32)) {
    let sx = (flag.x - cam.0).floor();
    let sy = (flag.y - cam.1).floor();
    if sx < -FLAG_CULL_MARGIN
        || sx > screen_width() + FLAG_CULL_MARGIN
        || sy < -FLAG_CULL_MARGIN
        || sy > screen_height() + FLAG_CULL_MARGIN
    {
        return;
    }
    draw_flag_marker(sx, sy, FLAG_RED);
    draw_outlined_text(&flag.username, sx + 7.0, sy + 25.0, 12, REMOTE_LABEL);
}

/// Draw one player: avatar frame centered on its position when one resolves,
/// otherwise the colored placeholder square, plus the name label and the
/// carried-flag glyph for the local player.
pub fn draw_player(
    player: &Player,
    avatars: &AvatarStore,
    cam: (f32, f32),
    is_local: bool,
    carrying_flag: bool,
) {
    let sx = (player.x - cam.0).floor();
    let sy = (player.y - cam.1).floor();

    let avatar = player.avatar.as_deref().unwrap_or("");
    match avatars.frame(avatar, player.facing, player.animation_frame) {
        Some(frame) => {
            let dx = (sx - frame.width() / 2.0).floor();
            let dy = (sy - frame.height() / 2.0).floor();
            draw_texture(frame, dx, dy, WHITE);
        }
        None => {
            let dx = (sx - PLACEHOLDER_SIZE / 2.0).floor();
            let dy = (sy - PLACEHOLDER_SIZE / 2.0).floor();
            let color = if is_local { LOCAL_SQUARE } else { REMOTE_SQUARE };
            draw_rectangle(dx, dy, PLACEHOLDER_SIZE, PLACEHOLDER_SIZE, color);
        }
    }

    if is_local && carrying_flag {
        draw_flag_marker(sx - 20.0, sy - 30.0, FLAG_RED);
    }

    let name = if player.username.is_empty() {
        "Player"
    } else {
        &player.username
    };
    let fill = if is_local { LOCAL_LABEL } else { REMOTE_LABEL };
    let width = measure_text(name, None, 14, 1.0).width;
    draw_outlined_text(name, sx - width / 2.0, sy - 20.0, 14, fill);
}

/// Text with a dark outline for contrast against the world image. macroquad
/// has no stroke pass, so the outline is the same string drawn at the eight
/// neighbor offsets first.
fn draw_outlined_text(text: &str, x: f32, y: f32, font_size: u16, fill: Color) {
    for dx in [-1.0, 0.0, 1.0] {
        for dy in [-1.0, 0.0, 1.0] {
            if dx == 0.0 && dy == 0.0 {
                continue;
            }
            draw_text(text, x + dx, y + dy, font_size as f32, LABEL_OUTLINE);
        }
    }
    draw_text(text, x, y, font_size as f32, fill);
}
