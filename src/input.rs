//! Keyboard handling: the terminal event reader thread and the key map.

use std::io;
use std::thread::{self, JoinHandle};

use crossbeam_channel::Sender;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::debug;

/// State changes a key press can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    ScrollUp,
    ScrollDown,
}

/// Terminal events the coordinator cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Key(KeyEvent),
    Resize { width: u16, height: u16 },
}

/// Maps a key press to a [`Command`]; unbound keys yield `None`.
pub fn command_for(key: KeyEvent) -> Option<Command> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Some(Command::Quit),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Command::Quit),
        KeyCode::Up => Some(Command::ScrollUp),
        KeyCode::Down => Some(Command::ScrollDown),
        _ => None,
    }
}

/// Spawns the thread that blocks on terminal events and forwards them.
///
/// A read error is forwarded and ends the thread, as does a dropped receiver.
pub fn spawn_reader(tx: Sender<io::Result<InputEvent>>) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("input".to_owned())
        .spawn(move || {
            loop {
                let forwarded = match event::read() {
                    Ok(Event::Key(key)) => Ok(InputEvent::Key(key)),
                    Ok(Event::Resize(width, height)) => Ok(InputEvent::Resize { width, height }),
                    Ok(_) => continue,
                    Err(err) => Err(err),
                };
                let failed = forwarded.is_err();
                if tx.send(forwarded).is_err() || failed {
                    debug!("input reader stopping");
                    return;
                }
            }
        })
}
