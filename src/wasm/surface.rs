//! Canvas presenter for the module's frame buffer.

use js_sys::{ArrayBuffer, Uint8ClampedArray, WebAssembly};
use wasm_bindgen::JsCast;
use web_sys::{window, CanvasRenderingContext2d, HtmlCanvasElement, ImageData};

use crate::driver::Presenter;
use crate::error::{ShellError, SurfaceError};
use crate::frame::{FrameLayout, FrameRegion};
use crate::wasm::bridge::describe;

pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
    layout: FrameLayout,
    memory: WebAssembly::Memory,
    region: FrameRegion,
}

impl CanvasSurface {
    /// Binds the canvas `canvas_id` to the frame buffer at `pointer` in `memory` and
    /// resizes it to the layout.
    pub fn attach(
        canvas_id: &str,
        layout: FrameLayout,
        memory: WebAssembly::Memory,
        pointer: u32,
    ) -> Result<Self, ShellError> {
        let document = window()
            .ok_or(SurfaceError::NoWindow)?
            .document()
            .ok_or(SurfaceError::NoDocument)?;
        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| SurfaceError::ElementNotFound(canvas_id.to_string()))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| SurfaceError::NotACanvas(canvas_id.to_string()))?;
        let context = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
            .ok_or_else(|| SurfaceError::ContextUnavailable(canvas_id.to_string()))?;

        let region = FrameRegion::locate(layout, pointer, memory_len(&memory))?;

        canvas.set_width(layout.width());
        canvas.set_height(layout.height());

        Ok(Self {
            canvas,
            context,
            layout,
            memory,
            region,
        })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    /// Read-only view over the frame buffer. Aliases module memory; nothing is copied.
    fn pixels(&self) -> Result<Uint8ClampedArray, ShellError> {
        // Growing memory detaches the previous buffer, so take the current one each time.
        let buffer = self.memory.buffer();
        self.region.check_within(memory_len(&self.memory))?;
        let pixels = Uint8ClampedArray::new_with_byte_offset_and_length(
            &buffer,
            self.region.offset(),
            self.region.byte_len() as u32,
        );
        self.layout.check_len(pixels.length() as usize)?;
        Ok(pixels)
    }
}

impl Presenter for CanvasSurface {
    fn present(&mut self) -> Result<(), ShellError> {
        let pixels = self.pixels()?;
        let image = ImageData::new_with_js_u8_clamped_array_and_sh(
            &pixels,
            self.layout.width(),
            self.layout.height(),
        )
        .map_err(|err| SurfaceError::Draw(describe(&err)))?;
        self.context
            .put_image_data(&image, 0.0, 0.0)
            .map_err(|err| SurfaceError::Draw(describe(&err)))?;
        Ok(())
    }
}

fn memory_len(memory: &WebAssembly::Memory) -> usize {
    memory.buffer().unchecked_into::<ArrayBuffer>().byte_length() as usize
}
