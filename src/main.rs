//! Host-side helper: `cargo run` builds the wasm package into `static/pkg` and serves
//! `static/` locally. Drop the compiled game next to `index.html` as `game.wasm`.

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    use std::env;
    use std::path::Path;
    use std::process::{Command, ExitCode};

    let port = env::var("PORT").unwrap_or_else(|_| "8000".to_string());

    println!("Building WASM pkg …");
    match Command::new("wasm-pack")
        .args(["build", "--release", "--target", "web", "--out-dir", "static/pkg"])
        .status()
    {
        Ok(st) if st.success() => {}
        Ok(_) => {
            eprintln!("wasm-pack finished with errors. Ensure wasm-pack is installed (https://rustwasm.github.io/wasm-pack/).");
            return ExitCode::FAILURE;
        }
        Err(_) => {
            eprintln!("wasm-pack not found in PATH. Skipping wasm build; the site may serve stale artifacts.");
        }
    }

    if !Path::new("static/game.wasm").exists() {
        eprintln!("static/game.wasm is missing; the page will report a load failure.");
    }

    println!("Serving static/ at http://127.0.0.1:{port} …");
    match Command::new("python3")
        .args(["-m", "http.server", &port, "--directory", "static"])
        .status()
    {
        Ok(st) if st.success() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("failed to start http server: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}
