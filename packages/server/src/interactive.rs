//! Interactive mode for the server.
//!
//! Prompts for the bind address, port and data locations before starting
//! the server.

use dialoguer::{Confirm, Input};

use crate::ServerConfig;

/// Runs the server in interactive mode, prompting for configuration.
///
/// Each answer is exported as the environment variable
/// [`ServerConfig::from_env`] reads (`BIND_ADDR`, `PORT`, `TILES_DIR`,
/// `FEATURES_PATH`) before delegating to [`super::run_server`].
///
/// # Errors
///
/// Returns an `std::io::Result` error if the underlying server fails to
/// start.
#[allow(clippy::future_not_send)]
pub async fn run() -> std::io::Result<()> {
    println!("AstraLens Server");
    println!();

    let current = ServerConfig::from_env();

    let bind_addr = prompt("Bind address", current.bind_addr);
    let port = prompt("Port", current.port.to_string());
    let tiles_dir = prompt("Tiles directory", current.tiles_dir.display().to_string());
    let features_path = prompt(
        "Feature database",
        current.features_path.display().to_string(),
    );

    // SAFETY: We are single-threaded at this point (before server starts) and
    // these variables are only read once during server initialisation.
    unsafe {
        std::env::set_var("BIND_ADDR", &bind_addr);
        std::env::set_var("PORT", &port);
        std::env::set_var("TILES_DIR", &tiles_dir);
        std::env::set_var("FEATURES_PATH", &features_path);
    }

    if !Confirm::new()
        .with_prompt(format!("Start server on {bind_addr}:{port}?"))
        .default(true)
        .interact()
        .unwrap_or(true)
    {
        println!("Cancelled.");
        return Ok(());
    }

    super::run_server().await
}

fn prompt(label: &str, default: String) -> String {
    Input::new()
        .with_prompt(label)
        .default(default.clone())
        .interact_text()
        .unwrap_or(default)
}
