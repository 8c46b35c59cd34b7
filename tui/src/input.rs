//! Input handling for the lyapviz TUI.
//!
//! Events are read synchronously on the main thread; each key is applied to
//! the [`Session`] to completion before the next one is read.

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::debug;

use lyapviz_engine::{CameraPreset, InputMode, Session, SurfaceKind};

const INPUT_POLL_TIMEOUT: Duration = Duration::from_millis(250);
const MAX_EVENTS_PER_FRAME: usize = 64; // never starve rendering

/// Arrow-key slice step as a fraction of the range.
pub const SLICE_STEP: f64 = 0.01;
/// Page-key slice step as a fraction of the range.
pub const SLICE_PAGE_STEP: f64 = 0.1;
/// Degrees per rotation key press.
pub const ROTATE_STEP: f64 = 15.0;

/// Wait for input, then apply every queued event.
///
/// Returns `Ok(true)` once the session wants to quit.
pub fn handle_events(session: &mut Session) -> Result<bool> {
    if !event::poll(INPUT_POLL_TIMEOUT)? {
        return Ok(session.should_quit());
    }
    let mut processed = 0;
    while processed < MAX_EVENTS_PER_FRAME {
        let ev = event::read()?;
        if apply_event(session, ev) {
            return Ok(true);
        }
        processed += 1;
        if !event::poll(Duration::ZERO)? {
            break;
        }
    }
    Ok(session.should_quit())
}

/// Apply one terminal event. Returns whether the session should quit.
pub fn apply_event(session: &mut Session, event: Event) -> bool {
    match event {
        // Handle press + repeat events (ignore releases)
        Event::Key(key) if !matches!(key.kind, KeyEventKind::Release) => {
            handle_key(session, key);
        }
        Event::Paste(text) => {
            if let Some(mut entry) = session.slice_entry_mut() {
                for c in text.chars() {
                    entry.push_char(c);
                }
            }
        }
        _ => {}
    }
    session.should_quit()
}

pub fn handle_key(session: &mut Session, key: KeyEvent) {
    // Ctrl+C quits from any mode
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        session.request_quit();
        return;
    }
    match session.input_mode() {
        InputMode::Normal => handle_normal_mode(session, key),
        InputMode::SliceEntry => handle_slice_entry_mode(session, key),
    }
}

fn handle_normal_mode(session: &mut Session, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => session.request_quit(),
        KeyCode::Up => {
            session.step_slice(SLICE_STEP);
        }
        KeyCode::Down => {
            session.step_slice(-SLICE_STEP);
        }
        KeyCode::PageUp => {
            session.step_slice(SLICE_PAGE_STEP);
        }
        KeyCode::PageDown => {
            session.step_slice(-SLICE_PAGE_STEP);
        }
        KeyCode::Home => {
            session.slice_to_min();
        }
        KeyCode::End => {
            session.slice_to_max();
        }
        KeyCode::Enter | KeyCode::Char('/') => session.begin_slice_entry(),
        KeyCode::Tab | KeyCode::BackTab => session.toggle_surface(),
        KeyCode::Char('v') => session.select_surface(SurfaceKind::V),
        KeyCode::Char('d') => session.select_surface(SurfaceKind::Vdot),
        KeyCode::Char('1') => session.set_camera(CameraPreset::TopDown),
        KeyCode::Char('2') => session.set_camera(CameraPreset::X1Side),
        KeyCode::Char('3') => session.set_camera(CameraPreset::X2Side),
        KeyCode::Left => session.rotate(-ROTATE_STEP, 0.0),
        KeyCode::Right => session.rotate(ROTATE_STEP, 0.0),
        KeyCode::Char('[') => session.rotate(0.0, -ROTATE_STEP),
        KeyCode::Char(']') => session.rotate(0.0, ROTATE_STEP),
        KeyCode::Char('r') => session.reset_camera(),
        _ => {}
    }
}

fn handle_slice_entry_mode(session: &mut Session, key: KeyEvent) {
    let Some(mut entry) = session.slice_entry_mut() else {
        return;
    };
    match key.code {
        KeyCode::Enter => {
            // Malformed text is dropped; the field shows the committed value again.
            if let Err(err) = entry.submit() {
                debug!(%err, "slice entry rejected");
            }
        }
        KeyCode::Esc => entry.cancel(),
        KeyCode::Backspace => entry.backspace(),
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => entry.clear(),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => entry.push_char(c),
        _ => {}
    }
}
