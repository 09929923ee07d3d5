mod app;
mod error;
mod input;
mod logging;
mod rank;
mod sampler;
mod ui;
mod viewport;

use std::io;

use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, bounded, never, select, unbounded};
use ratatui::Terminal;
use ratatui::backend::Backend;
use ratatui::layout::Rect;
use tracing::{info, warn};

use app::App;
use input::InputEvent;
use rank::{RankedProcessList, TOP_N};
use sampler::{MetricSample, SysinfoProvider};

/// Everything the coordinator listens to.
struct Feeds {
    samples: Receiver<MetricSample>,
    processes: Receiver<RankedProcessList>,
    input: Receiver<io::Result<InputEvent>>,
}

fn main() -> Result<()> {
    let _log_guard = logging::init()?;

    let mut terminal = ratatui::try_init().context("failed to initialize terminal")?;
    let result = start(&mut terminal);
    ratatui::restore();

    match &result {
        Ok(()) => info!("dashboard closed"),
        Err(err) => warn!(error = %err, "dashboard failed"),
    }
    result
}

fn start<B: Backend>(terminal: &mut Terminal<B>) -> Result<()> {
    // One pending snapshot per feed; samplers drop newer ones until it is taken.
    let (sample_tx, samples) = bounded(1);
    let (process_tx, processes) = bounded(1);
    let (input_tx, input) = unbounded();

    sampler::spawn_fast(SysinfoProvider::new(), sample_tx).context("failed to start CPU sampler")?;
    sampler::spawn_slow(SysinfoProvider::new(), TOP_N, process_tx)
        .context("failed to start process sampler")?;
    input::spawn_reader(input_tx).context("failed to start input reader")?;

    let size = terminal.size().context("failed to read terminal size")?;
    let mut app = App::new(ui::visible_rows(Rect::new(0, 0, size.width, size.height)));
    info!(visible_rows = app.viewport.visible_rows(), "dashboard started");

    let feeds = Feeds {
        samples,
        processes,
        input,
    };
    run(terminal, &mut app, feeds)
}

/// Applies messages one at a time and repaints after each state change.
/// Snapshots that queued up behind a slow repaint collapse to the newest.
///
/// Returns when a quit key arrives or the input feed fails.
fn run<B: Backend>(terminal: &mut Terminal<B>, app: &mut App, mut feeds: Feeds) -> Result<()> {
    terminal.draw(|f| ui::draw(f, app))?;

    while app.running {
        let dirty = select! {
            recv(feeds.samples) -> msg => match msg {
                Ok(sample) => {
                    app.publish_sample(newest(sample, &feeds.samples));
                    true
                }
                Err(_) => {
                    warn!("CPU sampler stopped, gauges will no longer update");
                    feeds.samples = never();
                    false
                }
            },
            recv(feeds.processes) -> msg => match msg {
                Ok(list) => {
                    app.publish_processes(newest(list, &feeds.processes));
                    true
                }
                Err(_) => {
                    warn!("process sampler stopped, table will no longer update");
                    feeds.processes = never();
                    false
                }
            },
            recv(feeds.input) -> msg => {
                let event = msg
                    .context("input reader stopped")?
                    .context("failed to read terminal event")?;
                handle_input(app, event)
            },
        };

        if dirty {
            terminal.draw(|f| ui::draw(f, app))?;
        }
    }

    Ok(())
}

/// Returns the last value already waiting on `rx`, or `first` if none is.
fn newest<T>(first: T, rx: &Receiver<T>) -> T {
    rx.try_iter().last().unwrap_or(first)
}

/// Dispatches one terminal event. Returns whether a repaint is due.
fn handle_input(app: &mut App, event: InputEvent) -> bool {
    match event {
        InputEvent::Key(key) => input::command_for(key).is_some_and(|cmd| app.apply(cmd)),
        InputEvent::Resize { width, height } => {
            app.resize(ui::visible_rows(Rect::new(0, 0, width, height)));
            true
        }
    }
}
