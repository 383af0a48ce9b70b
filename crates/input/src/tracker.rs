use glam::Vec2;

/// A directional movement key, already mapped from the window layer's
/// physical key codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveKey {
    Forward,
    Backward,
    Left,
    Right,
}

/// A high-level command produced by the input layer.
///
/// The session and shell consume commands, never raw input events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Fire the weapon (left mouse button while locked).
    Fire,
    /// Start a reload if the weapon allows it.
    Reload,
    /// Leave the gameplay screen.
    RequestExit,
    /// Attempt to (re)acquire the pointer lock.
    RequestResume,
}

/// One movement axis with a value in {-1, 0, 1}.
///
/// The axis remembers which key last set it. Releasing a key only zeroes
/// the axis if that key is the current owner; releasing the other
/// direction's key leaves the axis untouched. This matches the behavior
/// of tracking each axis by last-active key rather than a key stack.
#[derive(Debug, Default, Clone, Copy)]
struct Axis {
    value: i8,
    owner: Option<MoveKey>,
}

impl Axis {
    fn press(&mut self, key: MoveKey, value: i8) {
        self.value = value;
        self.owner = Some(key);
    }

    fn release(&mut self, key: MoveKey) {
        if self.owner == Some(key) {
            self.value = 0;
            self.owner = None;
        }
    }
}

/// Tracks movement intent and the pointer-lock state.
///
/// Setup and teardown are paired to the session lifecycle: the shell
/// creates one tracker per gameplay session and drops it on exit, so no
/// listener state outlives the session.
#[derive(Debug, Default)]
pub struct InputTracker {
    forward: Axis,
    strafe: Axis,
    locked: bool,
}

impl InputTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, key: MoveKey) {
        match key {
            MoveKey::Forward => self.forward.press(key, 1),
            MoveKey::Backward => self.forward.press(key, -1),
            MoveKey::Left => self.strafe.press(key, -1),
            MoveKey::Right => self.strafe.press(key, 1),
        }
    }

    pub fn key_up(&mut self, key: MoveKey) {
        match key {
            MoveKey::Forward | MoveKey::Backward => self.forward.release(key),
            MoveKey::Left | MoveKey::Right => self.strafe.release(key),
        }
    }

    /// Current intent as (strafe, forward), each component in {-1, 0, 1}.
    pub fn intent(&self) -> Vec2 {
        Vec2::new(self.strafe.value as f32, self.forward.value as f32)
    }

    /// Whether look/move/fire input is live.
    pub fn locked(&self) -> bool {
        self.locked
    }

    /// Record a pointer-lock change. Returns true if the state actually
    /// flipped, so the caller can mirror it into the session's pause flag.
    pub fn set_locked(&mut self, locked: bool) -> bool {
        if self.locked == locked {
            return false;
        }
        self.locked = locked;
        if !locked {
            // Key-up events are lost while unlocked; drop stale intent.
            self.forward = Axis::default();
            self.strafe = Axis::default();
        }
        tracing::debug!(locked, "pointer lock changed");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_key_sets_and_clears_axis() {
        let mut t = InputTracker::new();
        t.key_down(MoveKey::Forward);
        assert_eq!(t.intent(), Vec2::new(0.0, 1.0));
        t.key_up(MoveKey::Forward);
        assert_eq!(t.intent(), Vec2::ZERO);
    }

    #[test]
    fn last_key_wins_on_same_axis() {
        let mut t = InputTracker::new();
        t.key_down(MoveKey::Forward);
        t.key_down(MoveKey::Backward);
        assert_eq!(t.intent().y, -1.0);
    }

    #[test]
    fn releasing_non_owner_key_does_not_clear_axis() {
        let mut t = InputTracker::new();
        t.key_down(MoveKey::Forward);
        t.key_down(MoveKey::Backward);
        // Backward owns the axis now; releasing Forward must not touch it.
        t.key_up(MoveKey::Forward);
        assert_eq!(t.intent().y, -1.0);
    }

    #[test]
    fn releasing_owner_zeroes_axis_even_if_other_key_held() {
        let mut t = InputTracker::new();
        t.key_down(MoveKey::Forward);
        t.key_down(MoveKey::Backward);
        // Forward is still physically held but no longer the owner. The
        // axis goes to zero rather than silently re-applying Forward.
        t.key_up(MoveKey::Backward);
        assert_eq!(t.intent().y, 0.0);
    }

    #[test]
    fn axes_are_independent() {
        let mut t = InputTracker::new();
        t.key_down(MoveKey::Forward);
        t.key_down(MoveKey::Right);
        assert_eq!(t.intent(), Vec2::new(1.0, 1.0));
        t.key_up(MoveKey::Forward);
        assert_eq!(t.intent(), Vec2::new(1.0, 0.0));
    }

    #[test]
    fn unlocking_clears_held_intent() {
        let mut t = InputTracker::new();
        t.set_locked(true);
        t.key_down(MoveKey::Forward);
        assert!(t.set_locked(false));
        assert_eq!(t.intent(), Vec2::ZERO);
    }

    #[test]
    fn set_locked_reports_actual_change_only() {
        let mut t = InputTracker::new();
        assert!(t.set_locked(true));
        assert!(!t.set_locked(true));
        assert!(t.set_locked(false));
        assert!(!t.set_locked(false));
    }
}
