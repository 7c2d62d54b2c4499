use std::env;
use std::io;
use std::sync::Arc;
use std::sync::mpsc;

use crossterm::cursor::{Hide, Show};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};

use crate::library::{FsStore, PlaylistFile, PlaylistPersistence};
use crate::pipeline::{RodioPipeline, SourceEvent};
use crate::session::Controller;

mod commands;
mod event_loop;
mod settings;
mod startup;
mod status;


fn init_logging() {
    // stderr only; RUST_LOG overrides the default level.
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .try_init();
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    let settings = settings::load_settings();

    let source = startup::PlaylistSource::from_arg(env::args().nth(1))?;
    let entries = source.load_entries(&settings.library)?;

    // Pipeline events are queued here and applied on this thread by the loop.
    let (event_tx, event_rx) = mpsc::channel::<SourceEvent>();
    let pipeline = RodioPipeline::spawn(settings.audio.clone(), move |event| {
        let _ = event_tx.send(event);
    })?;
    let mut store = FsStore::new(settings.playlist.journal_root.clone());
    if let Some(dir) = source.base_dir() {
        store = store.with_base_dir(dir);
    }

    let status = Arc::new(status::StatusView::new());
    let mut controller = Controller::new(pipeline, store, &settings.session);
    controller.add_observer(status.clone());
    controller.set_volume(settings.audio.volume);
    controller.load_entries(entries);
    startup::start_first_available(&mut controller)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, Hide)?;

    let run_result = event_loop::run(&mut controller, &event_rx, &settings, &status);

    controller.close();
    disable_raw_mode()?;
    execute!(stdout, Show, LeaveAlternateScreen)?;

    if settings.playlist.save_on_exit {
        if let Some(path) = source.save_target() {
            PlaylistFile.save(&path, controller.playlist())?;
        }
    }

    run_result
}
