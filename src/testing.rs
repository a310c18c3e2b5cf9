//! Recording doubles for the module bridge and presenter.

use std::collections::VecDeque;

use crate::driver::Presenter;
use crate::error::{BridgeCallError, ShellError, SurfaceError};
use crate::input::InputCode;
use crate::module::{Export, GameModule};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Width,
    Height,
    Init,
    Step,
    Render,
    SetInput(i32),
    IncreaseSpeed,
    DecreaseSpeed,
}

pub struct RecordingModule {
    pub width: i32,
    pub height: i32,
    pub pointer: u32,
    pub calls: Vec<Call>,
    /// Results handed out by `step`, in order; `Ok(false)` once exhausted.
    pub steps: VecDeque<Result<bool, BridgeCallError>>,
    pub fail_render: bool,
}

impl RecordingModule {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            pointer: 1024,
            calls: Vec::new(),
            steps: VecDeque::new(),
            fail_render: false,
        }
    }

    pub fn with_steps(mut self, steps: impl IntoIterator<Item = bool>) -> Self {
        self.steps = steps.into_iter().map(Ok).collect();
        self
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

pub fn threw(export: Export) -> BridgeCallError {
    BridgeCallError::Threw {
        export: export.symbol(),
        message: "unreachable executed".to_string(),
    }
}

impl GameModule for RecordingModule {
    fn width(&mut self) -> Result<i32, BridgeCallError> {
        self.calls.push(Call::Width);
        Ok(self.width)
    }

    fn height(&mut self) -> Result<i32, BridgeCallError> {
        self.calls.push(Call::Height);
        Ok(self.height)
    }

    fn init(&mut self) -> Result<u32, BridgeCallError> {
        self.calls.push(Call::Init);
        Ok(self.pointer)
    }

    fn step(&mut self) -> Result<bool, BridgeCallError> {
        self.calls.push(Call::Step);
        self.steps.pop_front().unwrap_or(Ok(false))
    }

    fn render(&mut self) -> Result<(), BridgeCallError> {
        self.calls.push(Call::Render);
        if self.fail_render {
            return Err(threw(Export::Render));
        }
        Ok(())
    }

    fn set_input(&mut self, code: InputCode) -> Result<(), BridgeCallError> {
        self.calls.push(Call::SetInput(code.code()));
        Ok(())
    }

    fn increase_speed(&mut self) -> Result<(), BridgeCallError> {
        self.calls.push(Call::IncreaseSpeed);
        Ok(())
    }

    fn decrease_speed(&mut self) -> Result<(), BridgeCallError> {
        self.calls.push(Call::DecreaseSpeed);
        Ok(())
    }
}

#[derive(Default)]
pub struct CountingPresenter {
    pub presented: usize,
    pub fail: bool,
}

impl Presenter for CountingPresenter {
    fn present(&mut self) -> Result<(), ShellError> {
        if self.fail {
            return Err(SurfaceError::Draw("context lost".to_string()).into());
        }
        self.presented += 1;
        Ok(())
    }
}
