//! Driving a session through terminal events.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use lyapviz_engine::{
    Camera, CameraPreset, GridSpec, InputMode, LyapunovProblem, Session, StateVars, SurfaceKind,
};
use lyapviz_tui::apply_event;
use lyapviz_types::ui::format_slice_value;

fn reference_session() -> Session {
    let vars = StateVars::default();
    let problem = LyapunovProblem::parse("-x1**3", "-x2", "x1**2 + x2**2", &vars).unwrap();
    Session::new(
        problem.v(),
        problem.vdot(),
        vars,
        GridSpec::new(3.0, 80).unwrap(),
    )
}

fn key(code: KeyCode) -> Event {
    Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

fn send(session: &mut Session, events: impl IntoIterator<Item = Event>) -> bool {
    let mut quit = false;
    for event in events {
        quit = apply_event(session, event);
    }
    quit
}

fn typed(text: &str) -> Vec<Event> {
    text.chars().map(|c| key(KeyCode::Char(c))).collect()
}

#[test]
fn session_starts_on_v_at_its_minimum() {
    let session = reference_session();
    let state = session.state();
    assert_eq!(state.surface, SurfaceKind::V);
    assert_eq!(state.slice, session.range().min());
    assert_eq!(state.camera, Camera::default());
    assert_eq!(session.input_mode(), InputMode::Normal);
}

#[test]
fn slice_never_leaves_the_active_range() {
    let mut session = reference_session();
    send(&mut session, (0..30).map(|_| key(KeyCode::PageUp)));
    assert_eq!(session.slice_value(), session.range().max());

    send(&mut session, [key(KeyCode::Char('d'))]);
    let range = session.range();
    assert_eq!(session.state().surface, SurfaceKind::Vdot);
    assert!(range.contains(session.slice_value()));

    send(&mut session, (0..30).map(|_| key(KeyCode::PageDown)));
    assert_eq!(session.slice_value(), range.min());
}

#[test]
fn typed_slice_value_round_trips_through_the_field() {
    let mut session = reference_session();
    let mut events = vec![key(KeyCode::Enter)];
    events.push(Event::Key(KeyEvent::new(
        KeyCode::Char('u'),
        KeyModifiers::CONTROL,
    )));
    events.extend(typed("4.5"));
    events.push(key(KeyCode::Enter));
    send(&mut session, events);

    assert_eq!(session.input_mode(), InputMode::Normal);
    assert_eq!(session.slice_value(), 4.5);
    assert_eq!(session.slice_text(), "4.500");
}

#[test]
fn rejected_text_leaves_state_unchanged() {
    let mut session = reference_session();
    let before = session.state();
    let mut events = vec![key(KeyCode::Char('/'))];
    events.extend(typed("abc"));
    events.push(key(KeyCode::Enter));
    send(&mut session, events);

    assert_eq!(session.state(), before);
    assert_eq!(session.input_mode(), InputMode::Normal);
    assert_eq!(session.slice_text(), format_slice_value(before.slice));
}

#[test]
fn camera_presets_and_free_rotation() {
    let mut session = reference_session();
    for (digit, preset) in ['1', '2', '3'].into_iter().zip(CameraPreset::ALL) {
        send(&mut session, [key(KeyCode::Char(digit))]);
        assert_eq!(session.camera(), Camera::from_preset(preset));
    }
    send(&mut session, [key(KeyCode::Left), key(KeyCode::Char('['))]);
    assert_eq!(session.camera().preset(), None);
    send(&mut session, [key(KeyCode::Char('r'))]);
    assert_eq!(session.camera(), Camera::default());
}

#[test]
fn surface_switches_do_not_move_the_camera() {
    let mut session = reference_session();
    send(&mut session, [key(KeyCode::Char('2')), key(KeyCode::Tab)]);
    assert_eq!(session.state().surface, SurfaceKind::Vdot);
    assert_eq!(session.camera().preset(), Some(CameraPreset::X1Side));
}

#[test]
fn quit_keys_end_the_session() {
    let mut session = reference_session();
    assert!(send(&mut session, [key(KeyCode::Char('q'))]));

    let mut session = reference_session();
    assert!(!send(&mut session, [key(KeyCode::Enter), key(KeyCode::Esc)]));
    assert!(send(&mut session, [key(KeyCode::Esc)]));
}
