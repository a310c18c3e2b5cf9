//! Poll/redraw state machine.
//!
//! The driver never touches timers itself. The runtime calls [`LoopDriver::poll`] once per
//! poll interval and [`LoopDriver::frame`] once per display refresh it was asked for, and
//! the driver decides what the module and presenter do in each.

use log::{debug, error};

use crate::error::{BridgeCallError, ShellError};
use crate::module::GameModule;

/// Blits the module's frame buffer to the screen.
pub trait Presenter {
    fn present(&mut self) -> Result<(), ShellError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Executing,
    Halted,
}

/// What the runtime should schedule after a poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Poll {
    /// Re-arm the poll timer.
    Continue,
    /// Re-arm the poll timer and request one display refresh.
    Redraw,
    /// Schedule nothing further.
    Halted,
}

#[derive(Debug)]
pub struct LoopDriver {
    state: LoopState,
    redraw_pending: bool,
    polls: u64,
}

impl Default for LoopDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl LoopDriver {
    pub fn new() -> Self {
        Self {
            state: LoopState::Idle,
            redraw_pending: false,
            polls: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state != LoopState::Halted
    }

    pub fn redraw_pending(&self) -> bool {
        self.redraw_pending
    }

    pub fn polls(&self) -> u64 {
        self.polls
    }

    pub fn poll<M: GameModule + ?Sized>(&mut self, module: &mut M) -> Result<Poll, BridgeCallError> {
        if self.state == LoopState::Halted {
            return Ok(Poll::Halted);
        }

        self.state = LoopState::Executing;
        self.polls += 1;
        let changed = match module.step() {
            Ok(changed) => changed,
            Err(err) => {
                error!("poll {} failed: {err}", self.polls);
                self.halt();
                return Err(err);
            }
        };
        self.state = LoopState::Idle;

        // A redraw already waiting on the display will pick up this change too.
        if changed && !self.redraw_pending {
            self.redraw_pending = true;
            return Ok(Poll::Redraw);
        }
        Ok(Poll::Continue)
    }

    /// Display-refresh callback. Returns whether a frame was drawn.
    pub fn frame<M, P>(&mut self, module: &mut M, presenter: &mut P) -> Result<bool, ShellError>
    where
        M: GameModule + ?Sized,
        P: Presenter + ?Sized,
    {
        if !self.redraw_pending || self.state == LoopState::Halted {
            return Ok(false);
        }
        self.redraw_pending = false;
        self.draw(module, presenter)?;
        Ok(true)
    }

    /// Unconditional `render` then `present`, used for the first frame.
    pub fn draw<M, P>(&mut self, module: &mut M, presenter: &mut P) -> Result<(), ShellError>
    where
        M: GameModule + ?Sized,
        P: Presenter + ?Sized,
    {
        if self.state == LoopState::Halted {
            return Ok(());
        }
        let drawn = module
            .render()
            .map_err(ShellError::from)
            .and_then(|()| presenter.present());
        if let Err(err) = drawn {
            error!("draw failed: {err}");
            self.halt();
            return Err(err);
        }
        Ok(())
    }

    pub fn halt(&mut self) {
        if self.state != LoopState::Halted {
            debug!("loop halted after {} polls", self.polls);
        }
        self.state = LoopState::Halted;
        self.redraw_pending = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::Export;
    use crate::testing::{threw, Call, CountingPresenter, RecordingModule};

    #[test]
    fn unchanged_polls_never_draw() {
        let mut module = RecordingModule::new(4, 4).with_steps([false; 10]);
        let mut presenter = CountingPresenter::default();
        let mut driver = LoopDriver::new();

        for _ in 0..10 {
            assert_eq!(driver.poll(&mut module).unwrap(), Poll::Continue);
            assert!(!driver.frame(&mut module, &mut presenter).unwrap());
        }
        assert_eq!(module.count(&Call::Render), 0);
        assert_eq!(presenter.presented, 0);
        assert_eq!(driver.polls(), 10);
    }

    #[test]
    fn change_requests_single_redraw() {
        let mut module = RecordingModule::new(4, 4).with_steps([true]);
        let mut presenter = CountingPresenter::default();
        let mut driver = LoopDriver::new();

        assert_eq!(driver.poll(&mut module).unwrap(), Poll::Redraw);
        assert!(driver.frame(&mut module, &mut presenter).unwrap());
        assert!(!driver.frame(&mut module, &mut presenter).unwrap());
        assert_eq!(module.count(&Call::Render), 1);
        assert_eq!(presenter.presented, 1);
    }

    #[test]
    fn changes_coalesce_until_drawn() {
        let mut module = RecordingModule::new(4, 4).with_steps([true, true, true]);
        let mut presenter = CountingPresenter::default();
        let mut driver = LoopDriver::new();

        assert_eq!(driver.poll(&mut module).unwrap(), Poll::Redraw);
        assert_eq!(driver.poll(&mut module).unwrap(), Poll::Continue);
        assert!(driver.redraw_pending());
        assert!(driver.frame(&mut module, &mut presenter).unwrap());
        assert_eq!(driver.poll(&mut module).unwrap(), Poll::Redraw);
    }

    #[test]
    fn step_failure_halts() {
        let mut module = RecordingModule::new(4, 4);
        module.steps.push_back(Err(threw(Export::Step)));
        let mut presenter = CountingPresenter::default();
        let mut driver = LoopDriver::new();

        assert!(driver.poll(&mut module).is_err());
        assert_eq!(driver.state(), LoopState::Halted);

        module.clear();
        assert_eq!(driver.poll(&mut module).unwrap(), Poll::Halted);
        driver.draw(&mut module, &mut presenter).unwrap();
        assert!(module.calls.is_empty());
    }

    #[test]
    fn present_failure_halts() {
        let mut module = RecordingModule::new(4, 4).with_steps([true]);
        let mut presenter = CountingPresenter {
            fail: true,
            ..Default::default()
        };
        let mut driver = LoopDriver::new();

        driver.poll(&mut module).unwrap();
        assert!(matches!(
            driver.frame(&mut module, &mut presenter),
            Err(ShellError::Surface(_))
        ));
        assert!(!driver.is_running());
    }

    #[test]
    fn halt_drops_pending_redraw() {
        let mut module = RecordingModule::new(4, 4).with_steps([true]);
        let mut presenter = CountingPresenter::default();
        let mut driver = LoopDriver::new();

        driver.poll(&mut module).unwrap();
        driver.halt();
        assert!(!driver.frame(&mut module, &mut presenter).unwrap());
        assert_eq!(presenter.presented, 0);
    }
}
