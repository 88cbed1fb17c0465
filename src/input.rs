use crate::protocol::Direction;

/// Minimum interval between outbound `move` commands, in seconds.
pub const MOVE_THROTTLE: f64 = 0.050;

/// Snapshot of the four movement keys for one frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeldKeys {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl HeldKeys {
    pub fn any(&self) -> bool {
        self.up || self.down || self.left || self.right
    }

    /// Direction to send when several keys are held at once. Checks run in
    /// the fixed order up, down, left, right and the last match wins, so
    /// right beats left beats down beats up.
    pub fn direction(&self) -> Option<Direction> {
        let mut dir = None;
        if self.up {
            dir = Some(Direction::Up);
        }
        if self.down {
            dir = Some(Direction::Down);
        }
        if self.left {
            dir = Some(Direction::Left);
        }
        if self.right {
            dir = Some(Direction::Right);
        }
        dir
    }
}

#[derive(Debug, PartialEq)]
pub enum MoveCommand {
    Move(Direction),
    Stop,
}

/// Turns per-frame key state into at most one outbound command: a throttled
/// `move` while keys are held, or a single `stop` on the frame every key was
/// released. `now` is wall time in seconds (macroquad `get_time()`).
#[derive(Debug, Default)]
pub struct MoveTracker {
    last_sent: Option<f64>,
    was_moving: bool,
}

impl MoveTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(&mut self, held: HeldKeys, now: f64) -> Option<MoveCommand> {
        if let Some(dir) = held.direction() {
            self.was_moving = true;
            let due = match self.last_sent {
                Some(t) => now - t >= MOVE_THROTTLE,
                None => true,
            };
            if due {
                self.last_sent = Some(now);
                return Some(MoveCommand::Move(dir));
            }
            None
        } else if self.was_moving {
            self.was_moving = false;
            Some(MoveCommand::Stop)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn held(up: bool, down: bool, left: bool, right: bool) -> HeldKeys {
        HeldKeys {
            up,
            down,
            left,
            right,
        }
    }

    #[test]
    fn test_throttle_allows_one_move_per_window() {
        let mut tracker = MoveTracker::new();
        let up = held(true, false, false, false);

        // Four ticks within 10ms: only the first goes out.
        assert_eq!(tracker.tick(up, 0.000), Some(MoveCommand::Move(Direction::Up)));
        assert_eq!(tracker.tick(up, 0.003), None);
        assert_eq!(tracker.tick(up, 0.006), None);
        assert_eq!(tracker.tick(up, 0.010), None);

        // Past the throttle window the next one goes out.
        assert_eq!(tracker.tick(up, 0.055), Some(MoveCommand::Move(Direction::Up)));
    }

    #[test]
    fn test_stop_sent_exactly_once_on_release() {
        let mut tracker = MoveTracker::new();
        let up = held(true, false, false, false);
        let none = HeldKeys::default();

        assert_eq!(tracker.tick(none, 0.0), None); // nothing held yet, no stop
        tracker.tick(up, 0.1);
        assert_eq!(tracker.tick(none, 0.2), Some(MoveCommand::Stop));
        assert_eq!(tracker.tick(none, 0.3), None);
        assert_eq!(tracker.tick(none, 0.4), None);
    }

    #[test]
    fn test_simultaneous_keys_resolve_deterministically() {
        assert_eq!(held(true, false, true, false).direction(), Some(Direction::Left));
        assert_eq!(held(true, true, true, true).direction(), Some(Direction::Right));
        assert_eq!(held(true, true, false, false).direction(), Some(Direction::Down));
        assert_eq!(held(true, false, false, false).direction(), Some(Direction::Up));
        assert_eq!(held(false, false, false, false).direction(), None);
    }

    #[test]
    fn test_stop_respects_no_throttle() {
        // A stop right after a move still goes out; only moves are throttled.
        let mut tracker = MoveTracker::new();
        tracker.tick(held(false, false, false, true), 1.000);
        assert_eq!(
            tracker.tick(HeldKeys::default(), 1.001),
            Some(MoveCommand::Stop)
        );
    }
}
