//! Contract between the shell and the compiled game module.

use crate::error::BridgeCallError;
use crate::input::InputCode;

/// Functions the game module must export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Export {
    Width,
    Height,
    Init,
    Step,
    Render,
    SetInput,
    IncreaseSpeed,
    DecreaseSpeed,
}

impl Export {
    pub const ALL: [Export; 8] = [
        Export::Width,
        Export::Height,
        Export::Init,
        Export::Step,
        Export::Render,
        Export::SetInput,
        Export::IncreaseSpeed,
        Export::DecreaseSpeed,
    ];

    /// Symbol name in the module's export table.
    pub fn symbol(self) -> &'static str {
        match self {
            Export::Width => "get_canvas_width",
            Export::Height => "get_canvas_height",
            Export::Init => "init",
            Export::Step => "execute_game_loop_iteration",
            Export::Render => "render",
            Export::SetInput => "set_input",
            Export::IncreaseSpeed => "increase_speed",
            Export::DecreaseSpeed => "decrease_speed",
        }
    }
}

/// Typed view of a loaded game module.
///
/// Calls are synchronous. Failures are returned as-is; nothing here retries.
pub trait GameModule {
    fn width(&mut self) -> Result<i32, BridgeCallError>;
    fn height(&mut self) -> Result<i32, BridgeCallError>;
    /// Sets up game state and returns the offset of the RGBA frame buffer in module memory.
    fn init(&mut self) -> Result<u32, BridgeCallError>;
    /// Advances the simulation by one poll. `true` when the visible state changed.
    fn step(&mut self) -> Result<bool, BridgeCallError>;
    /// Repaints the frame buffer.
    fn render(&mut self) -> Result<(), BridgeCallError>;
    fn set_input(&mut self, code: InputCode) -> Result<(), BridgeCallError>;
    fn increase_speed(&mut self) -> Result<(), BridgeCallError>;
    fn decrease_speed(&mut self) -> Result<(), BridgeCallError>;
}
