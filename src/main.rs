//! Binary entry point: load configuration and secrets, resolve the proxy
//! prompt, then hand control to the cycle runner.

use std::process;

use task_harvester::cycle::run_forever;
use task_harvester::http::TokioSleeper;
use task_harvester::utils::{prompt_yes_no, read_optional_lines, read_secret_lines, Config};

#[tokio::main]
async fn main() {
    match std::env::var("RUST_LOG") {
        Ok(val) => println!("[STARTUP] RUST_LOG is set to: '{}'", val),
        Err(_) => println!("[STARTUP] RUST_LOG is unset."),
    }

    // Default to `info` when `RUST_LOG` is unset or invalid to avoid silent startup.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        println!("[STARTUP] RUST_LOG invalid or unset; defaulting to 'info'");
        tracing_subscriber::EnvFilter::new("info")
    });
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    println!("[STARTUP] Tracing initialized.");

    if let Err(err) = run().await {
        tracing::error!("[FATAL] Fatal error: {err}");
        process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = Config::load()?;

    let keys = read_secret_lines(&config.keys_file)?;
    println!("[STARTUP] Loaded {} account key(s).", keys.len());

    let proxies = read_optional_lines(&config.proxies_file);
    println!("[STARTUP] Loaded {} proxy entries.", proxies.len());

    let use_proxy = match config.use_proxy {
        Some(answer) => answer,
        None => prompt_yes_no("Use proxies for this run? (y/N): ")?,
    };
    if use_proxy && proxies.is_empty() {
        tracing::warn!(
            "[STARTUP] Proxy usage enabled but `{}` has no entries; running direct.",
            config.proxies_file.display()
        );
    }
    if use_proxy && !proxies.is_empty() && proxies.len() < keys.len() {
        tracing::warn!(
            "[STARTUP] Fewer proxies ({}) than accounts ({}); entries are reused round-robin.",
            proxies.len(),
            keys.len()
        );
    }

    let run_cfg = config.into_run_config(use_proxy);
    run_forever(&run_cfg, &keys, &proxies, &TokioSleeper).await;
    Ok(())
}
