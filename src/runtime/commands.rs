use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::config::ControlsSettings;
use crate::error::Result;
use crate::library::MediaStore;
use crate::pipeline::PipelineFacade;
use crate::session::{Clock, Controller};

/// What a key press asks the session to do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    TogglePlay,
    Next,
    Previous,
    Stop,
    /// Relative seek in seconds.
    SeekBy(i64),
    RemoveCurrent,
    RefreshAvailability,
    /// Relative volume change.
    Volume(f32),
    Quit,
}

pub fn command_for_key(key: KeyEvent, controls: &ControlsSettings) -> Option<Command> {
    let scrub = controls.scrub_seconds.min(i64::MAX as u64) as i64;

    let cmd = match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Command::Quit,
        KeyCode::Char('q') | KeyCode::Esc => Command::Quit,
        KeyCode::Char(' ') => Command::TogglePlay,
        KeyCode::Char('n') => Command::Next,
        KeyCode::Char('p') => Command::Previous,
        KeyCode::Char('s') => Command::Stop,
        KeyCode::Right => Command::SeekBy(scrub),
        KeyCode::Left => Command::SeekBy(-scrub),
        KeyCode::Char('d') => Command::RemoveCurrent,
        KeyCode::Char('r') => Command::RefreshAvailability,
        KeyCode::Char('+') | KeyCode::Char('=') => Command::Volume(controls.volume_step),
        KeyCode::Char('-') => Command::Volume(-controls.volume_step),
        _ => return None,
    };
    Some(cmd)
}

/// Run `cmd` against the session. Returns `true` when the user asked to quit.
pub fn apply_command<P, S, C>(controller: &mut Controller<P, S, C>, cmd: Command) -> Result<bool>
where
    P: PipelineFacade,
    S: MediaStore,
    C: Clock,
{
    match cmd {
        Command::TogglePlay => {
            controller.play_pause_toggle()?;
        }
        Command::Next => {
            controller.next()?;
        }
        Command::Previous => {
            controller.previous()?;
        }
        Command::Stop => controller.stop(),
        Command::SeekBy(secs) => scrub(controller, secs),
        Command::RemoveCurrent => {
            if let Some(index) = controller.current_index() {
                controller.remove_track(index)?;
            }
        }
        Command::RefreshAvailability => {
            controller.refresh_availability();
        }
        Command::Volume(delta) => {
            let volume = controller.state().volume + delta;
            controller.set_volume(volume);
        }
        Command::Quit => return Ok(true),
    }
    Ok(false)
}

/// Keyboard seeking goes through the same press/drag/release cycle as the
/// slider, released immediately.
fn scrub<P, S, C>(controller: &mut Controller<P, S, C>, secs: i64)
where
    P: PipelineFacade,
    S: MediaStore,
    C: Clock,
{
    if !controller.begin_seek() {
        return;
    }

    let state = controller.state();
    if let Some(duration_ns) = state.duration_ns.filter(|d| *d > 0) {
        let target = state.position_ns as i128 + secs as i128 * 1_000_000_000;
        let target = target.clamp(0, duration_ns as i128);
        controller.update_seek(target as f64 / duration_ns as f64);
    }
    controller.end_seek();
}
