use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::input::{Key, KeyState};

/// Translates a winit keyboard event. Auto-repeats arrive as presses.
pub(crate) fn translate_key_event(event: &KeyEvent) -> (Key, KeyState) {
    (map_key(event.physical_key), map_state(event.state))
}

pub(crate) fn map_state(state: ElementState) -> KeyState {
    match state {
        ElementState::Pressed => KeyState::Pressed,
        ElementState::Released => KeyState::Released,
    }
}

pub(crate) fn map_key(pk: PhysicalKey) -> Key {
    match pk {
        PhysicalKey::Code(code) => match code {
            KeyCode::KeyA => Key::A,
            KeyCode::KeyD => Key::D,
            KeyCode::ArrowLeft => Key::ArrowLeft,
            KeyCode::ArrowRight => Key::ArrowRight,
            other => Key::Unknown(other as u32),
        },

        // NativeKeyCode is not a u32 in winit 0.30; preserve "unknown" without a stable numeric.
        PhysicalKey::Unidentified(_) => Key::Unknown(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::keyboard::NativeKeyCode;

    #[test]
    fn orbit_keys_map() {
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::KeyA)), Key::A);
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::KeyD)), Key::D);
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::ArrowLeft)), Key::ArrowLeft);
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::ArrowRight)), Key::ArrowRight);
    }

    #[test]
    fn unmapped_keys_are_unknown() {
        assert!(matches!(
            map_key(PhysicalKey::Code(KeyCode::KeyW)),
            Key::Unknown(_)
        ));
        assert_eq!(
            map_key(PhysicalKey::Unidentified(NativeKeyCode::Unidentified)),
            Key::Unknown(0)
        );
    }

    #[test]
    fn element_state_maps() {
        assert_eq!(map_state(ElementState::Pressed), KeyState::Pressed);
        assert_eq!(map_state(ElementState::Released), KeyState::Released);
    }
}
