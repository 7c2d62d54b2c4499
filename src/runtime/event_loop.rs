use std::io;
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEventKind};

use crate::config;
use crate::library::MediaStore;
use crate::pipeline::{PipelineFacade, SourceEvent};
use crate::session::{Clock, Controller};

use super::commands::{apply_command, command_for_key};
use super::status::{StatusView, draw, render_lines};

/// Upper bound on how long the loop waits for a key before checking the
/// pipeline queue again.
const MAX_WAIT: Duration = Duration::from_millis(50);

/// The session's single thread of control: pipeline events, timers and keys
/// are all handled here, one at a time. Returns when the user quits.
pub fn run<P, S, C>(
    controller: &mut Controller<P, S, C>,
    events: &Receiver<SourceEvent>,
    settings: &config::Settings,
    status: &StatusView,
) -> Result<(), Box<dyn std::error::Error>>
where
    P: PipelineFacade,
    S: MediaStore,
    C: Clock,
{
    let mut stdout = io::stdout();
    status.mark_dirty();

    loop {
        // Events produced on the pipeline thread are applied here, never there.
        while let Ok(ev) = events.try_recv() {
            if let Err(e) = controller.handle_pipeline_event(ev) {
                log::error!("Failed to handle pipeline event: {e}");
            }
        }

        controller.tick();

        if status.take_dirty() {
            let lines = render_lines(
                &status.snapshot(),
                controller.playlist(),
                controller.current_index(),
            );
            draw(&mut stdout, &lines, controller.current_index())?;
        }

        if event::poll(wait_time(controller.next_deadline(), Instant::now()))? {
            match event::read()? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    let Some(cmd) = command_for_key(key, &settings.controls) else {
                        continue;
                    };
                    match apply_command(controller, cmd) {
                        Ok(true) => break,
                        Ok(false) => {}
                        Err(e) => log::warn!("{e}"),
                    }
                    // Playlist edits do not always change the snapshot.
                    status.mark_dirty();
                }
                Event::Resize(_, _) => status.mark_dirty(),
                _ => {}
            }
        }
    }

    Ok(())
}

/// How long to block on input: until the next timer deadline, capped at `MAX_WAIT`.
pub(super) fn wait_time(deadline: Option<Instant>, now: Instant) -> Duration {
    deadline.map_or(MAX_WAIT, |d| d.saturating_duration_since(now).min(MAX_WAIT))
}
