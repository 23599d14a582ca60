mod assistant;
mod config;
mod error;
mod export;
mod filter;
mod keys;
mod layers;
mod model;
mod sample;
mod source;
mod state;
mod ui;
mod worker;

use crate::assistant::Assistant;
use crate::config::{Args, Config};
use crate::source::SampleSource;
use crate::state::{Action, AppState, Command};
use crate::worker::Worker;
use anyhow::Context;
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{error, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::fs::OpenOptions;
use std::sync::{mpsc, Arc};
use std::{io, time::Duration};

type Tui = Terminal<CrosstermBackend<io::Stdout>>;

/// Logs go to a file: the terminal belongs to the UI.
fn init_logging(config: &Config) -> anyhow::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.logging.file)
        .with_context(|| format!("cannot open log file {}", config.logging.file.display()))?;
    env_logger::Builder::from_default_env()
        .filter_level(config.log_level())
        .format_target(false)
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn rng_for(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::resolve(&args)?;
    init_logging(&config)?;
    info!("Starting intellipcap");

    let mut rng = rng_for(config.sample.seed);
    let source = Arc::new(SampleSource::new(sample::sample_packets(&mut rng)));
    let assistant = Assistant::from_config(&config.assistant)?;

    let (tx, rx) = mpsc::channel::<Action>();
    let mut state = AppState::new(rng, assistant.label());
    let worker = Worker::new(tx, source, assistant, config.export.directory.clone());

    if args.sample {
        worker.dispatch(Command::Load(None));
    } else if let Some(path) = args.capture.clone() {
        worker.dispatch(Command::Load(Some(path)));
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    terminal.clear()?;

    let result = run(&mut terminal, &mut state, &worker, &rx);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        error!("UI loop failed: {}", e);
    }
    info!("Exiting intellipcap");
    result
}

fn run(
    terminal: &mut Tui,
    state: &mut AppState,
    worker: &Worker,
    rx: &mpsc::Receiver<Action>,
) -> anyhow::Result<()> {
    loop {
        while let Ok(action) = rx.try_recv() {
            if let Some(command) = state.update(action) {
                worker.dispatch(command);
            }
        }

        terminal.draw(|f| ui::draw(f, state))?;

        if event::poll(Duration::from_millis(16))? {
            if let Event::Key(key) = event::read()? {
                let Some(action) = keys::map_key(state.view, state.mode, key) else {
                    continue;
                };
                match state.update(action) {
                    Some(Command::Quit) => break,
                    Some(command) => worker.dispatch(command),
                    None => {}
                }
            }
        }
    }
    Ok(())
}
