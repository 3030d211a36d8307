//! gesture_sender — interactive entry point.

use std::path::PathBuf;

use gesture_sender::app::{run, AppConfig};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║        Gesture Sender — fist-to-clipboard relay              ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
    println!("  1. Place your hand in the center box and press 'C' to");
    println!("     calibrate for your lighting.");
    println!("  2. Copy some text.");
    println!("  3. Show a FIST to send it.");
    println!("  4. 'F' sends manually, 'D' toggles debug lines, Esc quits.");
    println!();

    let config = match load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };
    log::info!("relaying to {}", config.relay.endpoint);

    if let Err(e) = run(config) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

/// `--config <file>` loads JSON overrides; `--debug` turns the contour
/// overlay on regardless of the file.
fn load_config() -> anyhow::Result<AppConfig> {
    let mut config_path: Option<PathBuf> = None;
    let mut debug = false;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let path = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--config requires a file path"))?;
                config_path = Some(path.into());
            }
            "--debug" => debug = true,
            other => {
                anyhow::bail!("unknown argument: {} (expected --config <file> or --debug)", other);
            }
        }
    }

    let mut cfg = match config_path {
        Some(path) => AppConfig::from_json_file(&path)?,
        None => AppConfig::default(),
    };
    cfg.show_debug |= debug;
    Ok(cfg)
}
