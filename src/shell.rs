//! Ties a loaded module, a presenter, and the loop driver together.

use std::time::Duration;

use log::{error, info, trace};

use crate::driver::{LoopDriver, Poll, Presenter};
use crate::error::ShellError;
use crate::frame::FrameLayout;
use crate::input::{self, Action};
use crate::module::GameModule;

pub struct Shell<M, P> {
    module: M,
    presenter: P,
    driver: LoopDriver,
    layout: FrameLayout,
    interval: Duration,
    inputs: u64,
}

impl<M: GameModule, P: Presenter> Shell<M, P> {
    /// Reads the canvas size, initialises the module, attaches the presenter, and draws
    /// the first frame.
    ///
    /// `attach` receives the validated layout and the frame buffer offset returned by
    /// `init`; it is not called if anything before it fails.
    pub fn start<A>(mut module: M, interval: Duration, attach: A) -> Result<Self, ShellError>
    where
        A: FnOnce(FrameLayout, u32) -> Result<P, ShellError>,
    {
        let width = module.width()?;
        let height = module.height()?;
        let layout = FrameLayout::from_reported(width, height)?;
        let pointer = module.init()?;
        info!("game canvas {width}x{height}, frame buffer at {pointer:#x}");

        let presenter = attach(layout, pointer)?;
        let mut shell = Self {
            module,
            presenter,
            driver: LoopDriver::new(),
            layout,
            interval,
            inputs: 0,
        };
        shell.driver.draw(&mut shell.module, &mut shell.presenter)?;
        Ok(shell)
    }

    pub fn poll(&mut self) -> Result<Poll, ShellError> {
        Ok(self.driver.poll(&mut self.module)?)
    }

    pub fn frame(&mut self) -> Result<bool, ShellError> {
        self.driver.frame(&mut self.module, &mut self.presenter)
    }

    /// Routes a key name. Unrecognised keys issue no module call.
    pub fn key(&mut self, key: &str) -> Result<Option<Action>, ShellError> {
        let Some(action) = input::route(key) else {
            return Ok(None);
        };
        if !self.driver.is_running() {
            return Ok(None);
        }
        trace!("key {key:?} -> {action:?}");
        if let Err(err) = action.dispatch(&mut self.module) {
            error!("input dispatch failed: {err}");
            self.driver.halt();
            return Err(err.into());
        }
        self.inputs += 1;
        Ok(Some(action))
    }

    pub fn stop(&mut self) {
        self.driver.halt();
    }

    pub fn is_running(&self) -> bool {
        self.driver.is_running()
    }

    pub fn layout(&self) -> FrameLayout {
        self.layout
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Key actions dispatched to the module so far.
    pub fn inputs(&self) -> u64 {
        self.inputs
    }

    pub fn driver(&self) -> &LoopDriver {
        &self.driver
    }
}
