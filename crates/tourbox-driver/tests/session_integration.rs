//! End-to-end tests: scripted serial bytes in, recorded sink calls out.
//!
//! Most tests drive `DriverSession::tick` with synthetic instants so timing is
//! exact.  The `run_*` tests go through the async loop with real time and a
//! short window.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tourbox_core::{Decoder, KeyCode, RelativeAxis};
use tourbox_driver::application::dispatch_event::{Dispatcher, OutputSink};
use tourbox_driver::application::poll_session::{DriverSession, SessionError, TransportError};
use tourbox_driver::infrastructure::output::mock::{RecordingSink, SinkCall};
use tourbox_driver::infrastructure::storage::config::parse_config;
use tourbox_driver::infrastructure::transport::mock::{ScriptedTransport, Step};

const TICK: Duration = Duration::from_millis(2);

fn key(name: &str) -> KeyCode {
    KeyCode::from_name(name).unwrap()
}

/// Builds a session from a TOML config snippet.
fn session_from(toml: &str, transport: ScriptedTransport) -> (DriverSession, Arc<RecordingSink>) {
    let config = parse_config(toml).unwrap();
    let sink = Arc::new(RecordingSink::new());
    let session = DriverSession::new(
        Decoder::with_window(config.window()),
        Dispatcher::new(config.binding_table().unwrap()),
        Box::new(transport),
        Arc::clone(&sink) as Arc<dyn OutputSink>,
    );
    (session, sink)
}

/// Ticks `n` times, `TICK` apart, starting at `start`.
fn tick_n(session: &mut DriverSession, start: Instant, n: u32) {
    for i in 0..n {
        session.tick(start + TICK * i).unwrap();
    }
}

#[test]
fn test_single_side_press_taps_calc_after_window() {
    // Arrange
    let (mut session, sink) = session_from("", ScriptedTransport::from_bytes([0x81]));
    let start = Instant::now();

    // Act: 10 ticks = 18 ms, still inside the window
    tick_n(&mut session, start, 10);
    let before_window = sink.calls();
    tick_n(&mut session, start + TICK * 10, 10);

    // Assert
    assert!(before_window.is_empty());
    assert_eq!(sink.calls(), vec![SinkCall::KeyTap(key("KEY_CALC"))]);
}

#[test]
fn test_double_side_press_taps_sleep_only() {
    let (mut session, sink) = session_from("", ScriptedTransport::from_bytes([0x81, 0x21]));

    tick_n(&mut session, Instant::now(), 30);

    assert_eq!(sink.calls(), vec![SinkCall::KeyTap(key("KEY_SLEEP"))]);
}

#[test]
fn test_side_then_dpad_up_taps_both_in_order() {
    let (mut session, sink) = session_from("", ScriptedTransport::from_bytes([0x81, 0x90]));

    tick_n(&mut session, Instant::now(), 30);

    assert_eq!(
        sink.calls(),
        vec![
            SinkCall::KeyTap(key("KEY_CALC")),
            SinkCall::KeyTap(key("KEY_UP")),
        ]
    );
}

#[test]
fn test_wheel_directions_emit_opposite_deltas() {
    // Arrange
    let toml = "[bindings]\nWHEEL_UP = \"REL_WHEEL:3\"\n";
    let (mut session, sink) = session_from(toml, ScriptedTransport::from_bytes([0x49, 0x09]));

    // Act
    tick_n(&mut session, Instant::now(), 4);

    // Assert
    assert_eq!(
        sink.calls(),
        vec![
            SinkCall::Relative(RelativeAxis::Wheel, 3),
            SinkCall::Relative(RelativeAxis::Wheel, -1),
        ]
    );
}

#[test]
fn test_disabled_wheel_up_emits_nothing() {
    let toml = "[bindings]\nWHEEL_UP = \"DISABLED\"\n";
    let (mut session, sink) = session_from(toml, ScriptedTransport::from_bytes([0x49, 0x49]));

    tick_n(&mut session, Instant::now(), 4);

    assert!(sink.calls().is_empty());
}

#[test]
fn test_unknown_bytes_are_skipped() {
    let (mut session, sink) = session_from("", ScriptedTransport::from_bytes([0xEE, 0x2a, 0x00]));

    tick_n(&mut session, Instant::now(), 4);

    assert_eq!(sink.calls(), vec![SinkCall::KeyTap(key("KEY_MUTE"))]);
}

#[test]
fn test_slow_second_byte_is_two_singles() {
    // Arrange: 0x82 then 15 idle ticks (30 ms) then 0x13
    let mut steps = vec![Step::Byte(0x82)];
    steps.extend(std::iter::repeat(Step::Idle).take(15));
    steps.push(Step::Byte(0x13));
    let (mut session, sink) = session_from("", ScriptedTransport::from_steps(steps));

    // Act
    tick_n(&mut session, Instant::now(), 40);

    // Assert: Top single, then the lone double code on its own
    assert_eq!(
        sink.calls(),
        vec![
            SinkCall::KeyTap(key("KEY_REFRESH")),
            SinkCall::KeyTap(key("KEY_SCREENLOCK")),
        ]
    );
}

#[test]
fn test_output_errors_do_not_stop_the_session() {
    // Arrange
    let sink = Arc::new(RecordingSink::failing());
    let mut session = DriverSession::new(
        Decoder::new(),
        Dispatcher::new(tourbox_core::BindingTable::factory_default()),
        Box::new(ScriptedTransport::from_bytes([0x2a, 0x2a])),
        Arc::clone(&sink) as Arc<dyn OutputSink>,
    );
    let now = Instant::now();

    // Act
    let first = session.tick(now);
    let second = session.tick(now + TICK);

    // Assert
    assert_eq!(first.unwrap(), 1);
    assert_eq!(second.unwrap(), 1);
}

#[test]
fn test_run_stops_on_transport_error_and_tears_down_once() {
    // Arrange
    let transport = ScriptedTransport::from_bytes([0x2a]).then_fail();
    let (mut session, sink) = session_from("", transport);

    // Act
    let result = tokio_test::block_on(
        session.run(Duration::from_millis(1), std::future::pending::<()>()),
    );
    drop(session);

    // Assert
    assert!(matches!(
        result,
        Err(SessionError::Transport(TransportError::Closed))
    ));
    assert_eq!(sink.calls(), vec![SinkCall::KeyTap(key("KEY_MUTE"))]);
    assert_eq!(sink.releases(), 1);
    assert!(sink.teardown_calls() >= 2);
}

#[test]
fn test_run_resolves_pending_single_with_real_time() {
    // Arrange: 5 ms window, 1 ms polls, then 40 idle polls before failing
    let mut steps = vec![Step::Byte(0x81)];
    steps.extend(std::iter::repeat(Step::Idle).take(40));
    let toml = "[timing]\nwindow_ms = 5\npoll_interval_ms = 1\n";
    let (mut session, sink) = session_from(toml, ScriptedTransport::from_steps(steps).then_fail());

    // Act
    let result = tokio_test::block_on(
        session.run(Duration::from_millis(1), std::future::pending::<()>()),
    );

    // Assert
    assert!(result.is_err());
    assert_eq!(sink.calls(), vec![SinkCall::KeyTap(key("KEY_CALC"))]);
    assert!(sink.is_torn_down());
}

#[test]
fn test_run_returns_ok_on_shutdown() {
    let (mut session, sink) = session_from("", ScriptedTransport::idle());

    let result = tokio_test::block_on(session.run(Duration::from_millis(1), async {}));

    assert!(result.is_ok());
    assert_eq!(sink.releases(), 1);
}
