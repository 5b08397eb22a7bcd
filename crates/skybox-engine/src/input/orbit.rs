use super::{Key, KeyState};

/// Orbit direction for camera keys: `-1.0` decrements the orbit angle,
/// `+1.0` increments it. `None` for every other key.
pub fn orbit_direction(key: Key) -> Option<f32> {
    match key {
        Key::A | Key::ArrowLeft => Some(-1.0),
        Key::D | Key::ArrowRight => Some(1.0),
        _ => None,
    }
}

/// Orbit angle change for one key event. Presses and auto-repeats of an
/// orbit key move by `step`; releases and every other key do nothing.
pub fn orbit_step(key: Key, state: KeyState, step: f32) -> Option<f32> {
    match state {
        KeyState::Pressed => orbit_direction(key).map(|sign| sign * step),
        KeyState::Released => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn left_keys_decrement() {
        assert_eq!(orbit_direction(Key::A), Some(-1.0));
        assert_eq!(orbit_direction(Key::ArrowLeft), Some(-1.0));
    }

    #[test]
    fn right_keys_increment() {
        assert_eq!(orbit_direction(Key::D), Some(1.0));
        assert_eq!(orbit_direction(Key::ArrowRight), Some(1.0));
    }

    #[test]
    fn other_keys_ignored() {
        assert_eq!(orbit_direction(Key::Unknown(42)), None);
    }

    // ── key events ────────────────────────────────────────────────────────

    #[test]
    fn press_steps_by_the_configured_amount() {
        assert_eq!(orbit_step(Key::A, KeyState::Pressed, 0.05), Some(-0.05));
        assert_eq!(orbit_step(Key::ArrowRight, KeyState::Pressed, 0.05), Some(0.05));
    }

    #[test]
    fn release_does_not_step() {
        assert_eq!(orbit_step(Key::A, KeyState::Released, 0.05), None);
        assert_eq!(orbit_step(Key::D, KeyState::Released, 0.05), None);
    }

    #[test]
    fn non_orbit_press_does_not_step() {
        assert_eq!(orbit_step(Key::Unknown(7), KeyState::Pressed, 0.05), None);
    }
}
