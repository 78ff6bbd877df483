//! A sticky header whose menu items glide into an alternate layout as you
//! scroll past their sections.
//!
//! Run the binary to scroll through the landing page in the terminal.
//! Run with `--inspect` to print the measured geometry and exit.

mod app;
mod config;
mod dom;
mod engine;
mod ui;
mod widget;

use std::fs::File;
use std::io::{self, stderr};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, layout::Rect, widgets::Paragraph, Terminal};
use tracing_subscriber::EnvFilter;

use crate::app::{
    event::{spawn_event_reader, AppEvent},
    handler,
    state::AppState,
};
use crate::dom::style::FlexDirection;
use crate::dom::Target;
use crate::engine::easing::Easing;
use crate::engine::geometry;
use crate::engine::shadow::{compute_alternate_layout, ITEM_ATTR};
use crate::engine::Completion;
use crate::ui::{
    layout::AppLayout, page_view::DocumentView, progress_bar::ProgressIndicator, theme::Theme,
};
use crate::widget::header::{ITEM_SELECTOR, MENU_SELECTOR};

/// Target frame interval (~60 fps).
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

// ───────────────────────────────────────── CLI ───────────────

#[derive(Parser, Debug)]
#[command(name = env!("CARGO_PKG_NAME"), about = env!("CARGO_PKG_DESCRIPTION"))]
struct Cli {
    /// Distance in px from a section's top that counts as reaching it.
    #[arg(long)]
    threshold: Option<f64>,

    /// Slide duration in milliseconds.
    #[arg(long = "duration-ms")]
    duration_ms: Option<u64>,

    /// Timing curve: linear, ease-in, ease-out, ease-in-out.
    #[arg(long)]
    easing: Option<Easing>,

    /// When a slide counts as finished: timer or transitionend.
    #[arg(long)]
    completion: Option<Completion>,

    /// Flow direction the menu items slide towards: row or column.
    #[arg(long)]
    direction: Option<FlexDirection>,

    /// Write logs to this file instead of stderr.
    #[arg(long = "log-file")]
    log_file: Option<PathBuf>,

    /// Print resting positions and the alternate layout, then exit.
    #[arg(long)]
    inspect: bool,

    /// Save the effective configuration to the config file and exit.
    #[arg(long = "write-config")]
    write_config: bool,
}

impl Cli {
    /// Command-line flags override the config file.
    fn apply(&self, config: &mut config::AppConfig) -> Result<()> {
        let engine = &mut config.engine;
        if let Some(t) = self.threshold {
            if !engine.set_offset_threshold(t) {
                bail!("--threshold must be a finite, non-negative number of px, got {t}");
            }
        }
        if let Some(ms) = self.duration_ms {
            engine.set_duration(Duration::from_millis(ms));
        }
        if let Some(e) = self.easing {
            engine.easing = e;
        }
        if let Some(c) = self.completion {
            engine.completion = c;
        }
        if let Some(d) = self.direction {
            engine.alternate_direction = d;
        }
        Ok(())
    }
}

fn init_tracing(log_file: Option<&PathBuf>) -> Result<()> {
    let filter = EnvFilter::from_default_env();
    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("creating log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::stderr) // never pollute stdout
                .init();
        }
    }
    Ok(())
}

// ───────────────────────────────────────── inspect ───────────

fn inspect(state: &mut AppState) -> Result<()> {
    let engine = state.config.engine;
    println!(
        "viewport {}x{}px, threshold {}px, transition {}",
        state.doc.viewport().width,
        state.doc.viewport().height,
        engine.offset_threshold,
        engine.transition()
    );
    let shadow = compute_alternate_layout(
        &mut state.doc,
        Target::Selector(MENU_SELECTOR),
        engine.alternate_direction,
        ITEM_SELECTOR,
    )?;
    let Some(shadow) = shadow else {
        println!("menu `{MENU_SELECTOR}` not found");
        return Ok(());
    };
    if shadow.is_empty() {
        println!("menu `{MENU_SELECTOR}` has no items");
        return Ok(());
    }
    println!(
        "{} items, alternate flow {}",
        shadow.len(),
        shadow.direction.as_css()
    );
    println!("{:<10} {:>8}  {:>12}  {:>12}", "item", "resting", "current", "target");
    let menu = Target::Selector(MENU_SELECTOR).resolve(&state.doc);
    let show = |r: Option<dom::Rect>| {
        r.map_or_else(|| "-".to_string(), |r| format!("({:.0}, {:.0})", r.left, r.top))
    };
    for item in state.header.items() {
        let resting = state
            .header
            .tracker()
            .resting_position(&item.id)
            .map_or_else(|| "-".to_string(), |r| format!("{r:.0}"));
        let current = menu.and_then(|menu| {
            let el = state
                .doc
                .query_selector(menu, &format!("[{ITEM_ATTR}={}]", item.id))?;
            geometry::measure_relative(&state.doc, el, menu)
        });
        println!(
            "{:<10} {:>8}  {:>12}  {:>12}",
            item.id,
            resting,
            show(current),
            show(shadow.get(&item.id))
        );
    }
    Ok(())
}

// ───────────────────────────────────────── main ─────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_file.as_ref())?;

    let mut user_config = config::AppConfig::load();
    cli.apply(&mut user_config)?;

    if cli.write_config {
        let path = user_config.save()?;
        println!("wrote {}", path.display());
        return Ok(());
    }

    let (cols, rows) = crossterm::terminal::size().unwrap_or((80, 24));
    let layout = AppLayout::from_area(Rect::new(0, 0, cols, rows));
    let mut state = AppState::new(user_config, layout.viewport());

    if cli.inspect {
        return inspect(&mut state);
    }

    // ── terminal setup ────────────────────────────────────────
    enable_raw_mode()?;
    execute!(stderr(), EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stderr());
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut state).await;

    // ── teardown ──────────────────────────────────────────────
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    result
}

async fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stderr>>,
    state: &mut AppState,
) -> Result<()> {
    let mut events = spawn_event_reader(Duration::from_millis(100));
    let mut frames = tokio::time::interval(FRAME_INTERVAL);
    frames.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let started = Instant::now();
    let mut terminal_area = Rect::default();

    loop {
        terminal.draw(|frame| {
            terminal_area = frame.area();
            let layout = AppLayout::from_area(terminal_area);
            frame.render_widget(DocumentView::new(&state.doc), layout.page_area);

            let status = Paragraph::new(state.status_line()).style(Theme::status_bar_style());
            frame.render_widget(status, layout.status_area);
            frame.render_widget(
                ProgressIndicator {
                    progress: state.progress.progress(),
                    moving: state.header.animator().in_flight(),
                    tick: state.frame_count / 4,
                },
                layout.status_area,
            );
        })?;
        state.after_paint();

        tokio::select! {
            biased;

            Some(event) = events.recv() => {
                match event {
                    AppEvent::Key(k) => handler::handle_key(state, k),
                    AppEvent::Mouse(m) => handler::handle_mouse(state, m, terminal_area),
                    AppEvent::Resize(w, h) => {
                        let layout = AppLayout::from_area(Rect::new(0, 0, w, h));
                        state.resize(layout.viewport());
                    }
                }
            }

            _ = frames.tick() => state.frame(started.elapsed()),
        }

        if state.should_quit {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{DEFAULT_OFFSET_THRESHOLD, MAX_TRANSITION};

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("sticky-nav").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn flags_override_the_config() {
        let mut config = config::AppConfig::default();
        parse(&["--threshold", "4", "--duration-ms", "250", "--easing", "linear"])
            .apply(&mut config)
            .unwrap();
        assert_eq!(config.engine.offset_threshold, 4.0);
        assert_eq!(config.engine.duration, Duration::from_millis(250));
        assert_eq!(config.engine.easing, Easing::Linear);
    }

    #[test]
    fn out_of_range_flags_are_rejected_or_clamped() {
        let mut config = config::AppConfig::default();
        assert!(parse(&["--threshold", "inf"]).apply(&mut config).is_err());
        assert!(parse(&["--threshold=-2"]).apply(&mut config).is_err());
        assert_eq!(config.engine.offset_threshold, DEFAULT_OFFSET_THRESHOLD);

        parse(&["--duration-ms", "90000000"]).apply(&mut config).unwrap();
        assert_eq!(config.engine.duration, MAX_TRANSITION);
        parse(&["--duration-ms", "0"]).apply(&mut config).unwrap();
        assert_eq!(config.engine.duration, Duration::from_millis(1));
    }
}
