//! Keyboard routing. Maps `KeyboardEvent.key` names to module calls.

use crate::error::BridgeCallError;
use crate::module::GameModule;

/// Direction codes understood by the module's `set_input`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum InputCode {
    Left = 0,
    Right = 1,
    Up = 2,
    Down = 3,
}

impl InputCode {
    pub fn code(self) -> i32 {
        self as i32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Move(InputCode),
    SpeedUp,
    SlowDown,
}

impl Action {
    /// Issues exactly one module call for this action.
    pub fn dispatch<M: GameModule + ?Sized>(self, module: &mut M) -> Result<(), BridgeCallError> {
        match self {
            Action::Move(code) => module.set_input(code),
            Action::SpeedUp => module.increase_speed(),
            Action::SlowDown => module.decrease_speed(),
        }
    }
}

pub fn route(key: &str) -> Option<Action> {
    match key {
        "ArrowLeft" => Some(Action::Move(InputCode::Left)),
        "ArrowRight" => Some(Action::Move(InputCode::Right)),
        "ArrowUp" => Some(Action::Move(InputCode::Up)),
        "ArrowDown" => Some(Action::Move(InputCode::Down)),
        "+" => Some(Action::SpeedUp),
        "-" => Some(Action::SlowDown),
        _ => None,
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use crate::testing::{Call, RecordingModule};
    use proptest::prelude::*;

    const RECOGNIZED: [&str; 6] = ["ArrowLeft", "ArrowRight", "ArrowUp", "ArrowDown", "+", "-"];

    #[test]
    fn direction_codes() {
        assert_eq!(InputCode::Left.code(), 0);
        assert_eq!(InputCode::Right.code(), 1);
        assert_eq!(InputCode::Up.code(), 2);
        assert_eq!(InputCode::Down.code(), 3);
    }

    #[test]
    fn each_recognized_key_issues_one_call() {
        let expected = [
            Call::SetInput(0),
            Call::SetInput(1),
            Call::SetInput(2),
            Call::SetInput(3),
            Call::IncreaseSpeed,
            Call::DecreaseSpeed,
        ];
        for (key, call) in RECOGNIZED.iter().zip(expected) {
            let mut module = RecordingModule::new(8, 8);
            route(key).unwrap().dispatch(&mut module).unwrap();
            assert_eq!(module.calls, vec![call], "key {key}");
        }
    }

    #[test]
    fn lookalike_keys_are_ignored() {
        for key in ["arrowup", "Left", "=", "Add", "Subtract", " ", ""] {
            assert_eq!(route(key), None, "key {key:?}");
        }
    }

    proptest! {
        #[test]
        fn unrecognized_keys_route_nowhere(key in "\\PC{0,12}") {
            prop_assume!(!RECOGNIZED.contains(&key.as_str()));
            prop_assert_eq!(route(&key), None);
        }
    }
}
