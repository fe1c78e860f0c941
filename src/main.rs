//! Relay Latency Prober - Main CLI Application
//!
//! Measures TCP connect latency to a list of relay endpoints over several
//! rounds and writes them ranked by worst-case latency.

use anyhow::Context;
use clap::Parser;
use relay_latency_prober::{
    app::App,
    cli::Cli,
    config::{load_config, ProxyEnvironment},
    error::{install_panic_hook, AppError, ErrorReporter, Result},
    executor::cancellation_pair,
};
use std::process;

fn main() {
    install_panic_hook();

    let cli = Cli::parse();

    if cli.should_show_topic_help() {
        println!("{}", cli.display_help());
        return;
    }

    let reporter = ErrorReporter::new(cli.use_colors(), cli.verbose);

    if let Err(message) = cli.validate() {
        reporter.report_error(&AppError::config(message));
        process::exit(1);
    }

    if let Err(e) = run(cli) {
        reporter.report_error(&e);
        process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<()> {
    let terminal_colors = cli.use_colors();
    let mut config = load_config(cli)?;
    config.enable_color = config.enable_color && terminal_colors;
    colored::control::set_override(config.enable_color);

    // Environment mutation happens before any runtime thread exists
    let removed = ProxyEnvironment::disable();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    runtime.block_on(async move {
        let (handle, signal) = cancellation_pair();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                handle.cancel();
            }
        });

        App::new(config)
            .with_removed_proxies(removed)
            .run(signal)
            .await
            .map(|_| ())
    })
}
