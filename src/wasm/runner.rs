//! Timer and animation-frame scheduling around a [`Shell`].

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use log::{error, info};
use wasm_bindgen::{closure::Closure, prelude::*, JsCast};
use web_sys::{KeyboardEvent, Window};

use crate::config::ShellConfig;
use crate::driver::Poll;
use crate::error::{ShellError, SurfaceError};
use crate::shell::Shell;
use crate::wasm::bridge::{describe, WasmGame};
use crate::wasm::status::StatusSink;
use crate::wasm::surface::CanvasSurface;

type GameShell = Shell<WasmGame, CanvasSurface>;

/// Loads the module, attaches the canvas, draws once, and arms the first poll.
pub async fn launch(config: &ShellConfig, status: &StatusSink) -> Result<GameHandle, ShellError> {
    let game = WasmGame::load(&config.module_url, |stage| status.set(stage)).await?;

    let memory = game.memory().clone();
    let canvas_id = config.canvas_id.as_str();
    let shell = Shell::start(game, config.poll_interval(), |layout, pointer| {
        CanvasSurface::attach(canvas_id, layout, memory, pointer)
    })?;

    Runner::spawn(shell)
}

struct Runner {
    window: Window,
    shell: RefCell<GameShell>,
    poll_timer: Cell<Option<i32>>,
    frame_request: Cell<Option<i32>>,
    on_poll: RefCell<Option<Closure<dyn FnMut()>>>,
    on_frame: RefCell<Option<Closure<dyn FnMut(f64)>>>,
    on_key: RefCell<Option<Closure<dyn FnMut(KeyboardEvent)>>>,
}

impl Runner {
    fn spawn(shell: GameShell) -> Result<GameHandle, ShellError> {
        let window = web_sys::window().ok_or(SurfaceError::NoWindow)?;
        let runner = Rc::new(Runner {
            window,
            shell: RefCell::new(shell),
            poll_timer: Cell::new(None),
            frame_request: Cell::new(None),
            on_poll: RefCell::new(None),
            on_frame: RefCell::new(None),
            on_key: RefCell::new(None),
        });

        // Callbacks hold weak references; the handle owns the runner.
        let weak = Rc::downgrade(&runner);
        *runner.on_poll.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            with_runner(&weak, |r| r.poll());
        }) as Box<dyn FnMut()>));

        let weak = Rc::downgrade(&runner);
        *runner.on_frame.borrow_mut() = Some(Closure::wrap(Box::new(move |_ts: f64| {
            with_runner(&weak, |r| r.frame());
        }) as Box<dyn FnMut(f64)>));

        let weak = Rc::downgrade(&runner);
        *runner.on_key.borrow_mut() = Some(Closure::wrap(Box::new(move |event: KeyboardEvent| {
            with_runner(&weak, |r| r.key(&event));
        }) as Box<dyn FnMut(KeyboardEvent)>));

        let listening = match runner.on_key.borrow().as_ref() {
            Some(on_key) => runner
                .window
                .add_event_listener_with_callback("keydown", on_key.as_ref().unchecked_ref()),
            None => Ok(()),
        };
        listening
            .map_err(|err| SurfaceError::Draw(format!("keydown listener: {}", describe(&err))))?;

        runner.arm_poll();
        info!(
            "game loop started, polling every {:?}",
            runner.shell.borrow().interval()
        );
        Ok(GameHandle { runner })
    }

    fn poll(&self) {
        self.poll_timer.set(None);
        let outcome = self.shell.borrow_mut().poll();
        match outcome {
            Ok(Poll::Redraw) => {
                self.request_frame();
                self.arm_poll();
            }
            Ok(Poll::Continue) => self.arm_poll(),
            Ok(Poll::Halted) => {}
            Err(err) => {
                error!("game loop halted: {err}");
                self.halt();
            }
        }
    }

    fn frame(&self) {
        self.frame_request.set(None);
        let drawn = self.shell.borrow_mut().frame();
        if let Err(err) = drawn {
            error!("game loop halted: {err}");
            self.halt();
        }
    }

    fn key(&self, event: &KeyboardEvent) {
        let routed = self.shell.borrow_mut().key(&event.key());
        if let Err(err) = routed {
            error!("game loop halted: {err}");
            self.halt();
        }
    }

    fn arm_poll(&self) {
        // A halt during this poll (a failed frame request) must not re-arm.
        if !self.shell.borrow().is_running() {
            return;
        }
        let interval = self.shell.borrow().interval().as_millis();
        let timeout = i32::try_from(interval).unwrap_or(i32::MAX);
        let armed = match self.on_poll.borrow().as_ref() {
            Some(callback) => self
                .window
                .set_timeout_with_callback_and_timeout_and_arguments_0(
                    callback.as_ref().unchecked_ref(),
                    timeout,
                ),
            None => return,
        };
        match armed {
            Ok(id) => self.poll_timer.set(Some(id)),
            Err(err) => {
                error!("failed to arm poll timer: {}", describe(&err));
                self.halt();
            }
        }
    }

    fn request_frame(&self) {
        if self.frame_request.get().is_some() {
            return;
        }
        let requested = match self.on_frame.borrow().as_ref() {
            Some(callback) => self
                .window
                .request_animation_frame(callback.as_ref().unchecked_ref()),
            None => return,
        };
        match requested {
            Ok(id) => self.frame_request.set(Some(id)),
            Err(err) => {
                error!("failed to request animation frame: {}", describe(&err));
                self.halt();
            }
        }
    }

    /// Stops the shell, cancels anything scheduled, and detaches the key listener.
    fn halt(&self) {
        self.shell.borrow_mut().stop();
        if let Some(id) = self.poll_timer.take() {
            self.window.clear_timeout_with_handle(id);
        }
        if let Some(id) = self.frame_request.take() {
            let _ = self.window.cancel_animation_frame(id);
        }
        if let Some(on_key) = self.on_key.borrow().as_ref() {
            let _ = self
                .window
                .remove_event_listener_with_callback("keydown", on_key.as_ref().unchecked_ref());
        }
    }
}

impl Drop for Runner {
    fn drop(&mut self) {
        self.halt();
    }
}

fn with_runner(weak: &Weak<Runner>, f: impl FnOnce(&Runner)) {
    if let Some(runner) = weak.upgrade() {
        f(&runner);
    }
}

/// Returned by `boot()`. Dropping or freeing it stops the game.
#[wasm_bindgen]
pub struct GameHandle {
    runner: Rc<Runner>,
}

#[wasm_bindgen]
impl GameHandle {
    pub fn stop(&self) {
        if self.is_running() {
            info!("game loop stopped");
        }
        self.runner.halt();
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.runner.shell.borrow().is_running()
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.runner.shell.borrow().layout().width()
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.runner.shell.borrow().layout().height()
    }

    /// Polls completed since boot.
    #[wasm_bindgen(getter)]
    pub fn polls(&self) -> f64 {
        self.runner.shell.borrow().driver().polls() as f64
    }

    /// Key actions forwarded to the module since boot.
    #[wasm_bindgen(getter)]
    pub fn inputs(&self) -> f64 {
        self.runner.shell.borrow().inputs() as f64
    }
}
