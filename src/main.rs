//! push-surface - a control-surface core for a music host, with a terminal
//! simulator standing in for the hardware and the host.
//!
//! This is the main entry point for the simulator.
//! It uses the Component Architecture pattern from ratatui.

mod action;
mod app;
mod component;
mod config;
mod hardware;
mod mode;
mod model;
mod notify;
mod services;
mod subject;
mod surface;
mod task;
mod timefmt;
mod tui;
mod ui;

use crate::action::Action;
use crate::app::App;
use crate::config::Config;
use crate::tui::Tui;
use anyhow::{Context, Result};
use crossterm::event::Event;
use std::fs::{self, File};
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_ENV: &str = "PUSH_SURFACE_LOG";

fn main() -> Result<()> {
    if let Err(err) = init_logging() {
        eprintln!("Logging disabled: {:#}", err);
    }

    let config = Config::load();
    if !Config::is_saved() {
        if let Err(err) = config.save() {
            tracing::warn!("Could not write default config: {:#}", err);
        }
    }
    let mut app = App::new(config)?;

    // Setup terminal
    let mut tui = Tui::new()?.with_tick_rate(app.config.tick_rate());
    tui.enter()?;

    // Main event loop
    let result = run_app(&mut tui, &mut app);

    // Cleanup terminal
    tui.exit()?;

    // Handle any errors
    if let Err(err) = result {
        tracing::error!("{:#}", err);
        eprintln!("Error: {:?}", err);
        std::process::exit(1);
    }

    Ok(())
}

/// The terminal belongs to the UI, so logs go to a file
fn init_logging() -> Result<()> {
    let dir = Config::config_dir().context("Could not determine config directory")?;
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    let path = dir.join("push-surface.log");
    let file = File::create(&path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| "push_surface=info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .try_init()?;

    tracing::info!("Starting push-surface");
    Ok(())
}

/// Run the main application loop
fn run_app(tui: &mut Tui, app: &mut App) -> Result<()> {
    while !app.should_quit {
        // Draw the UI
        tui.draw(|frame| {
            if let Err(e) = app.draw(frame, frame.area()) {
                tracing::error!("Draw error: {:#}", e);
            }
        })?;

        // Poll for events
        if let Some(event) = tui.next_event()? {
            // Convert event to action
            let action = match event {
                Event::Key(key) => app.handle_key_event(key)?,
                Event::Resize(w, h) => Some(Action::Resize(w, h)),
                _ => None,
            };

            // Process the action and its follow-ups
            if let Some(action) = action {
                app.dispatch(action)?;
            }
        } else {
            // No event - the tick period is over
            app.dispatch(Action::Tick)?;
        }
    }

    Ok(())
}
