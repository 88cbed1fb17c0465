/// Viewport offset into world coordinates. The camera is a derived value,
/// recomputed from readable state every frame and never stored.
///
/// The target offset centers the player; each axis is then clamped so the
/// viewport never shows past the world edge. When the world is smaller than
/// the viewport on an axis the offset is pinned to 0 and the camera simply
/// never moves on that axis. Unknown player or world dimensions give (0, 0)
/// so rendering can start before the join snapshot or world image arrives.
pub fn offset(
    player: Option<(f32, f32)>,
    viewport: (f32, f32),
    world: Option<(f32, f32)>,
) -> (f32, f32) {
    let (px, py) = match player {
        Some(p) => p,
        None => return (0.0, 0.0),
    };
    let (ww, wh) = match world {
        Some(w) => w,
        None => return (0.0, 0.0),
    };
    let (vw, vh) = viewport;

    let target_x = px - (vw / 2.0).floor();
    let target_y = py - (vh / 2.0).floor();

    let max_x = (ww - vw).max(0.0);
    let max_y = (wh - vh).max(0.0);

    (target_x.clamp(0.0, max_x), target_y.clamp(0.0, max_y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centers_player_within_bounds() {
        // 500 - floor(800/2) = 100, 500 - floor(600/2) = 200; both inside
        // [0, world - viewport] so neither axis clamps.
        let cam = offset(Some((500.0, 500.0)), (800.0, 600.0), Some((1000.0, 1000.0)));
        assert_eq!(cam, (100.0, 200.0));
    }

    #[test]
    fn test_clamps_at_world_origin() {
        let cam = offset(Some((10.0, 10.0)), (800.0, 600.0), Some((1000.0, 1000.0)));
        assert_eq!(cam, (0.0, 0.0));
    }

    #[test]
    fn test_clamps_at_far_edge() {
        let cam = offset(Some((990.0, 990.0)), (800.0, 600.0), Some((1000.0, 1000.0)));
        assert_eq!(cam, (200.0, 400.0));
    }

    #[test]
    fn test_world_smaller_than_viewport_pins_axis() {
        // World narrower than the viewport: x never moves, y still follows.
        let cam = offset(Some((300.0, 800.0)), (800.0, 600.0), Some((500.0, 2000.0)));
        assert_eq!(cam.0, 0.0);
        assert_eq!(cam.1, 500.0);
    }

    #[test]
    fn test_unknown_inputs_give_origin() {
        assert_eq!(offset(None, (800.0, 600.0), Some((1000.0, 1000.0))), (0.0, 0.0));
        assert_eq!(offset(Some((5.0, 5.0)), (800.0, 600.0), None), (0.0, 0.0));
    }

    #[test]
    fn test_offset_always_within_bounds() {
        let dims = [100.0, 333.0, 800.0, 1024.0, 4000.0];
        let positions = [-50.0, 0.0, 10.0, 500.0, 5000.0];
        for &vw in &dims {
            for &ww in &dims {
                for &px in &positions {
                    let (cx, _) = offset(Some((px, 0.0)), (vw, vw), Some((ww, ww)));
                    let max = (ww - vw).max(0.0);
                    assert!(cx >= 0.0 && cx <= max, "cx={} out of [0,{}]", cx, max);
                    if ww <= vw {
                        assert_eq!(cx, 0.0);
                    }
                }
            }
        }
    }
}
