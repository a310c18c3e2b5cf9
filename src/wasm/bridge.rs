//! Loads the game module and wraps its exports as typed calls.

use js_sys::{Array, Function, Object, Reflect, WebAssembly};
use log::{debug, info};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::Response;

use crate::error::{BridgeCallError, LoadError};
use crate::input::InputCode;
use crate::module::{Export, GameModule};

/// Pages given to a module that imports its memory instead of exporting it (16 MiB).
const IMPORTED_MEMORY_PAGES: u32 = 256;

pub struct WasmGame {
    /// Indexed by `Export as usize`.
    functions: Vec<Function>,
    memory: WebAssembly::Memory,
}

impl WasmGame {
    /// Fetches, compiles, and instantiates the module at `url`, reporting each stage to
    /// `progress` before it starts.
    pub async fn load(url: &str, progress: impl Fn(&str)) -> Result<Self, LoadError> {
        progress(&format!("fetching {url}"));
        let bytes = fetch_bytes(url).await?;

        progress("compiling");
        let module: WebAssembly::Module = JsFuture::from(WebAssembly::compile(&bytes))
            .await
            .map_err(|err| LoadError::Compile(describe(&err)))?
            .unchecked_into();

        progress("instantiating");
        let imports = resolve_imports(&module)?;
        let instance: WebAssembly::Instance =
            JsFuture::from(WebAssembly::instantiate_module(&module, &imports.object))
                .await
                .map_err(|err| LoadError::Instantiate(describe(&err)))?
                .unchecked_into();

        info!("instantiated `{url}`");
        Self::from_exports(&instance.exports(), imports.memory)
    }

    /// Binds an export table. `imported_memory` is used when the table has no `memory`.
    pub fn from_exports(
        exports: &Object,
        imported_memory: Option<WebAssembly::Memory>,
    ) -> Result<Self, LoadError> {
        let functions = Export::ALL
            .iter()
            .map(|&export| lookup(exports, export))
            .collect::<Result<Vec<_>, _>>()?;

        let exported_memory = Reflect::get(exports, &JsValue::from_str("memory"))
            .ok()
            .and_then(|value| value.dyn_into::<WebAssembly::Memory>().ok());
        let memory = exported_memory
            .or(imported_memory)
            .ok_or(LoadError::MissingMemory)?;

        Ok(Self { functions, memory })
    }

    pub fn memory(&self) -> &WebAssembly::Memory {
        &self.memory
    }

    fn call(&self, export: Export, args: &Array) -> Result<JsValue, BridgeCallError> {
        self.functions[export as usize]
            .apply(&JsValue::UNDEFINED, args)
            .map_err(|err| BridgeCallError::Threw {
                export: export.symbol(),
                message: describe(&err),
            })
    }

    fn call_void(&self, export: Export) -> Result<(), BridgeCallError> {
        self.call(export, &Array::new()).map(|_| ())
    }

    fn call_i32(&self, export: Export) -> Result<i32, BridgeCallError> {
        let value = self.call(export, &Array::new())?;
        value
            .as_f64()
            .map(|n| n as i32)
            .ok_or_else(|| unexpected(export, &value))
    }
}

impl GameModule for WasmGame {
    fn width(&mut self) -> Result<i32, BridgeCallError> {
        self.call_i32(Export::Width)
    }

    fn height(&mut self) -> Result<i32, BridgeCallError> {
        self.call_i32(Export::Height)
    }

    fn init(&mut self) -> Result<u32, BridgeCallError> {
        // Pointers come back as signed i32.
        self.call_i32(Export::Init).map(|ptr| ptr as u32)
    }

    fn step(&mut self) -> Result<bool, BridgeCallError> {
        let value = self.call(Export::Step, &Array::new())?;
        value
            .as_bool()
            .or_else(|| value.as_f64().map(|n| n != 0.0))
            .ok_or_else(|| unexpected(Export::Step, &value))
    }

    fn render(&mut self) -> Result<(), BridgeCallError> {
        self.call_void(Export::Render)
    }

    fn set_input(&mut self, code: InputCode) -> Result<(), BridgeCallError> {
        self.call(Export::SetInput, &Array::of1(&JsValue::from(code.code())))
            .map(|_| ())
    }

    fn increase_speed(&mut self) -> Result<(), BridgeCallError> {
        self.call_void(Export::IncreaseSpeed)
    }

    fn decrease_speed(&mut self) -> Result<(), BridgeCallError> {
        self.call_void(Export::DecreaseSpeed)
    }
}

/// Best-effort message for a thrown JS value.
pub fn describe(value: &JsValue) -> String {
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

fn unexpected(export: Export, value: &JsValue) -> BridgeCallError {
    BridgeCallError::UnexpectedType {
        export: export.symbol(),
        found: describe(value),
    }
}

fn lookup(exports: &Object, export: Export) -> Result<Function, LoadError> {
    let symbol = export.symbol();
    // Some toolchains keep the C leading underscore.
    for name in [symbol.to_string(), format!("_{symbol}")] {
        let value = Reflect::get(exports, &JsValue::from_str(&name)).unwrap_or(JsValue::UNDEFINED);
        if value.is_undefined() {
            continue;
        }
        return value
            .dyn_into::<Function>()
            .map_err(|_| LoadError::NotAFunction(symbol));
    }
    Err(LoadError::MissingExport(symbol))
}

async fn fetch_bytes(url: &str) -> Result<JsValue, LoadError> {
    let fetch_error = |reason: String| LoadError::Fetch {
        url: url.to_string(),
        reason,
    };

    let window = web_sys::window().ok_or_else(|| fetch_error("no window".to_string()))?;
    let response: Response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(|err| fetch_error(describe(&err)))?
        .dyn_into()
        .map_err(|value| fetch_error(format!("not a Response: {}", describe(&value))))?;

    if !response.ok() {
        return Err(LoadError::HttpStatus {
            url: url.to_string(),
            status: response.status(),
        });
    }

    let body = response
        .array_buffer()
        .map_err(|err| fetch_error(describe(&err)))?;
    JsFuture::from(body)
        .await
        .map_err(|err| fetch_error(describe(&err)))
}

struct Imports {
    object: Object,
    memory: Option<WebAssembly::Memory>,
}

/// Satisfies every function and memory import the module declares. Globals and tables
/// are rejected.
fn resolve_imports(module: &WebAssembly::Module) -> Result<Imports, LoadError> {
    let object = Object::new();
    let mut memory = None;

    for descriptor in WebAssembly::Module::imports(module).iter() {
        let module_name = string_field(&descriptor, "module");
        let name = string_field(&descriptor, "name");
        let kind = string_field(&descriptor, "kind");

        let value = match kind.as_str() {
            "function" => host_function(&module_name, &name),
            "memory" => {
                let imported = new_memory()?;
                memory = Some(imported.clone());
                imported.into()
            }
            _ => {
                return Err(LoadError::UnsupportedImport {
                    module: module_name,
                    name,
                    kind,
                })
            }
        };

        let namespace = namespace(&object, &module_name)?;
        Reflect::set(&namespace, &JsValue::from_str(&name), &value)
            .map_err(|err| LoadError::Instantiate(describe(&err)))?;
    }

    Ok(Imports { object, memory })
}

fn namespace(imports: &Object, module_name: &str) -> Result<Object, LoadError> {
    let key = JsValue::from_str(module_name);
    let existing = Reflect::get(imports, &key).unwrap_or(JsValue::UNDEFINED);
    if let Ok(namespace) = existing.dyn_into::<Object>() {
        return Ok(namespace);
    }
    let namespace = Object::new();
    Reflect::set(imports, &key, &namespace).map_err(|err| LoadError::Instantiate(describe(&err)))?;
    Ok(namespace)
}

fn host_function(module_name: &str, name: &str) -> JsValue {
    match name.trim_start_matches('_') {
        "emscripten_get_now" => {
            Closure::wrap(Box::new(now_ms) as Box<dyn FnMut() -> f64>).into_js_value()
        }
        // Only `time(NULL)` is supported; the out-pointer is ignored.
        "time" => Closure::wrap(
            Box::new(|_out: JsValue| (js_sys::Date::now() / 1000.0).floor())
                as Box<dyn FnMut(JsValue) -> f64>,
        )
        .into_js_value(),
        _ => {
            debug!("stubbing import {module_name}.{name}");
            Closure::wrap(Box::new(|| 0) as Box<dyn FnMut() -> i32>).into_js_value()
        }
    }
}

fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or_else(js_sys::Date::now)
}

fn new_memory() -> Result<WebAssembly::Memory, LoadError> {
    let descriptor = Object::new();
    Reflect::set(
        &descriptor,
        &JsValue::from_str("initial"),
        &JsValue::from(IMPORTED_MEMORY_PAGES),
    )
    .map_err(|err| LoadError::Instantiate(describe(&err)))?;
    WebAssembly::Memory::new(&descriptor).map_err(|err| LoadError::Instantiate(describe(&err)))
}

fn string_field(object: &JsValue, field: &str) -> String {
    Reflect::get(object, &JsValue::from_str(field))
        .ok()
        .and_then(|value| value.as_string())
        .unwrap_or_default()
}
