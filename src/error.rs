//! Error types for every stage of the shell: loading the game module, attaching the
//! canvas, calling exports, and validating configuration.

use thiserror::Error;

/// The game artifact could not be fetched, compiled, or instantiated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("failed to fetch `{url}`: {reason}")]
    Fetch { url: String, reason: String },
    #[error("fetching `{url}` returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },
    #[error("failed to compile game module: {0}")]
    Compile(String),
    #[error("failed to instantiate game module: {0}")]
    Instantiate(String),
    #[error("game module does not export `{0}`")]
    MissingExport(&'static str),
    #[error("export `{0}` is not a function")]
    NotAFunction(&'static str),
    #[error("game module has no linear memory")]
    MissingMemory,
    #[error("unsupported import `{module}.{name}` of kind `{kind}`")]
    UnsupportedImport {
        module: String,
        name: String,
        kind: String,
    },
}

/// The drawing surface could not be obtained.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    #[error("no window available")]
    NoWindow,
    #[error("no document available")]
    NoDocument,
    #[error("element `{0}` not found")]
    ElementNotFound(String),
    #[error("element `{0}` is not a canvas")]
    NotACanvas(String),
    #[error("2D context unavailable on `{0}`")]
    ContextUnavailable(String),
    #[error("failed to draw frame: {0}")]
    Draw(String),
}

/// An exported call failed. Never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeCallError {
    #[error("`{export}` threw: {message}")]
    Threw {
        export: &'static str,
        message: String,
    },
    #[error("`{export}` returned unexpected value {found}")]
    UnexpectedType { export: &'static str, found: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid option `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
    #[error("invalid options: {0}")]
    Options(String),
    #[error("module reported non-positive canvas size {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },
    #[error("frame of {width}x{height} pixels exceeds the 32-bit address space")]
    FrameTooLarge { width: u32, height: u32 },
    #[error("frame buffer is {actual} bytes, expected {expected}")]
    BufferLength { expected: usize, actual: usize },
    #[error("frame buffer at {offset:#x}+{len} lies outside {memory_len} bytes of module memory")]
    OutOfBounds {
        offset: u32,
        len: usize,
        memory_len: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShellError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Surface(#[from] SurfaceError),
    #[error(transparent)]
    Call(#[from] BridgeCallError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[cfg(target_arch = "wasm32")]
impl From<ShellError> for wasm_bindgen::JsValue {
    fn from(err: ShellError) -> Self {
        js_sys::Error::new(&err.to_string()).into()
    }
}
