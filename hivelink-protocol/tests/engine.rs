//! End-to-end tests driving the engine through an in-memory serial port.

use hivelink_hal::mock::{MockClock, MockSerial};
use hivelink_protocol::wire::{header, CMD_RESULT_UNKNOWN_COMMAND, CMD_STATUS_FAILED};
use hivelink_protocol::{
    Checksum, Command, Dispatch, Engine, EngineConfig, FrameError, FrameParser, Message,
    INTENT_COMMAND_RESULT, INTENT_REGISTRATION_REQUEST, INTENT_REGISTRATION_RESPONSE_JSON,
    INTENT_USER,
};

type Serial = MockSerial<512>;
type TestEngine<'a, 'c> = Engine<'a, Serial, &'c MockClock, 4>;

const REGISTRATION: &str = r#"{"id":"b125698d","name":"sensor"}"#;
const INTENT_ECHO: u16 = INTENT_USER;
const INTENT_SILENT: u16 = INTENT_USER + 1;

/// Build a frame by hand, independent of the writer
fn frame(intent: u16, payload: &[u8]) -> Vec<u8> {
    let mut bytes = header(intent, payload.len() as u16).to_vec();
    bytes.extend_from_slice(payload);
    let mut sum = Checksum::new();
    sum.add_slice(&bytes);
    bytes.push(sum.trailer());
    bytes
}

fn command_payload(id: u32, args: &[u8]) -> Vec<u8> {
    let mut payload = id.to_le_bytes().to_vec();
    payload.extend_from_slice(args);
    payload
}

fn string_arg(s: &str) -> Vec<u8> {
    let mut arg = (s.len() as u16).to_le_bytes().to_vec();
    arg.extend_from_slice(s.as_bytes());
    arg
}

/// Decoded command-result frame
#[derive(Debug, PartialEq)]
struct CommandResult {
    id: u32,
    status: String,
    result: String,
}

/// Parse the first frame in `bytes`
fn parse_frame(bytes: &[u8], buf: &mut [u8]) -> (u16, usize) {
    let mut msg = Message::new(buf, 0);
    let mut parser = FrameParser::new(0);
    for &byte in bytes {
        if let Some(intent) = parser.feed(byte, 0, &mut msg).unwrap() {
            return (intent, msg.len());
        }
    }
    panic!("no complete frame in {:02X?}", bytes);
}

fn parse_command_result(bytes: &[u8]) -> CommandResult {
    let mut buf = [0u8; 256];
    let (intent, len) = parse_frame(bytes, &mut buf);
    assert_eq!(intent, INTENT_COMMAND_RESULT);

    let mut scratch = [0u8; 256];
    let mut msg = Message::new(&mut scratch, intent);
    msg.put_bytes(&bytes[8..8 + len]).unwrap();
    let id = msg.get_u32().unwrap();
    let mut status = [0u8; 64];
    let status_len = msg.get_string(&mut status).unwrap();
    let mut result = [0u8; 64];
    let result_len = msg.get_string(&mut result).unwrap();
    CommandResult {
        id,
        status: String::from_utf8(status[..status_len].to_vec()).unwrap(),
        result: String::from_utf8(result[..result_len].to_vec()).unwrap(),
    }
}

/// Replies with the first string argument
fn echo(cmd: &mut Command<'_, '_, Serial>) {
    let mut text = [0u8; 32];
    let len = cmd.message().get_string(&mut text).unwrap_or(0);
    let text = core::str::from_utf8(&text[..len]).unwrap_or("");
    cmd.reply("Completed", text).unwrap();
}

/// Handles the command without replying
fn silent(_cmd: &mut Command<'_, '_, Serial>) {}

fn started<'a, 'c>(buf: &'a mut [u8], clock: &'c MockClock) -> TestEngine<'a, 'c> {
    let mut engine = Engine::new(buf, clock, EngineConfig::with_rx_timeout(1000));
    engine.begin(Serial::new(), REGISTRATION);
    engine
}

fn push(engine: &mut TestEngine<'_, '_>, bytes: &[u8]) {
    let queued = engine.serial_mut().unwrap().push_rx(bytes);
    assert_eq!(queued, bytes.len());
}

fn tx(engine: &mut TestEngine<'_, '_>) -> Vec<u8> {
    engine.serial_mut().unwrap().tx().to_vec()
}

#[test]
fn test_registration_request_answered() {
    let clock = MockClock::new(0);
    let mut buf = [0u8; 64];
    let mut engine = started(&mut buf, &clock);

    push(&mut engine, &frame(INTENT_REGISTRATION_REQUEST, &[]));
    assert_eq!(engine.process(), Ok(Dispatch::Registration));

    let sent = tx(&mut engine);
    let mut out = [0u8; 128];
    let (intent, len) = parse_frame(&sent, &mut out);
    assert_eq!(intent, INTENT_REGISTRATION_RESPONSE_JSON);
    assert_eq!(len, 2 + REGISTRATION.len());
    assert_eq!(sent, frame(intent, &string_arg(REGISTRATION)));
}

#[test]
fn test_unknown_command_reports_failure() {
    let clock = MockClock::new(0);
    let mut buf = [0u8; 64];
    let mut engine = started(&mut buf, &clock);

    push(&mut engine, &frame(0x0500, &command_payload(42, &[])));
    assert_eq!(
        engine.process(),
        Ok(Dispatch::Unknown {
            intent: 0x0500,
            command: 42
        })
    );

    let result = parse_command_result(&tx(&mut engine));
    assert_eq!(
        result,
        CommandResult {
            id: 42,
            status: CMD_STATUS_FAILED.into(),
            result: CMD_RESULT_UNKNOWN_COMMAND.into(),
        }
    );
}

#[test]
fn test_handler_receives_id_and_arguments() {
    let clock = MockClock::new(0);
    let mut buf = [0u8; 64];
    let mut engine = started(&mut buf, &clock);
    engine.register(INTENT_ECHO, echo).unwrap();

    push(
        &mut engine,
        &frame(INTENT_ECHO, &command_payload(7, &string_arg("ping"))),
    );
    assert_eq!(
        engine.process(),
        Ok(Dispatch::Handled {
            intent: INTENT_ECHO,
            command: 7
        })
    );

    let result = parse_command_result(&tx(&mut engine));
    assert_eq!(result.id, 7);
    assert_eq!(result.status, "Completed");
    assert_eq!(result.result, "ping");
}

#[test]
fn test_handler_without_reply_sends_nothing() {
    let clock = MockClock::new(0);
    let mut buf = [0u8; 64];
    let mut engine = started(&mut buf, &clock);
    engine.register(INTENT_SILENT, silent).unwrap();

    push(&mut engine, &frame(INTENT_SILENT, &command_payload(1, &[])));
    assert!(matches!(engine.process(), Ok(Dispatch::Handled { .. })));
    assert!(tx(&mut engine).is_empty());
}

#[test]
fn test_unregistered_handler_falls_back() {
    let clock = MockClock::new(0);
    let mut buf = [0u8; 64];
    let mut engine = started(&mut buf, &clock);
    engine.register(INTENT_SILENT, silent).unwrap();
    assert!(engine.unregister(INTENT_SILENT));
    assert!(!engine.unregister(INTENT_SILENT));

    push(&mut engine, &frame(INTENT_SILENT, &command_payload(3, &[])));
    assert!(matches!(engine.process(), Ok(Dispatch::Unknown { command: 3, .. })));
}

#[test]
fn test_short_command_payload_uses_zero_id() {
    let clock = MockClock::new(0);
    let mut buf = [0u8; 64];
    let mut engine = started(&mut buf, &clock);

    push(&mut engine, &frame(0x0600, &[1, 2]));
    assert!(matches!(engine.process(), Ok(Dispatch::Unknown { command: 0, .. })));
}

#[test]
fn test_bad_checksum_is_absorbed() {
    let clock = MockClock::new(0);
    let mut buf = [0u8; 64];
    let mut engine = started(&mut buf, &clock);

    let mut corrupt = frame(0x0500, &command_payload(1, &[]));
    let last = corrupt.len() - 1;
    corrupt[last] ^= 0x01;
    push(&mut engine, &corrupt);
    push(&mut engine, &frame(0x0500, &command_payload(2, &[])));

    assert_eq!(engine.process(), Err(FrameError::BadChecksum));
    assert!(tx(&mut engine).is_empty());
    assert!(matches!(engine.process(), Ok(Dispatch::Unknown { command: 2, .. })));
}

#[test]
fn test_oversized_frame_rejected_before_payload() {
    let clock = MockClock::new(0);
    let mut buf = [0u8; 8];
    let mut engine = started(&mut buf, &clock);

    let big = frame(0x0500, &[0xAA; 9]);
    push(&mut engine, &big);
    assert_eq!(engine.process(), Err(FrameError::MessageTooBig));
    // Only the header up to the length field was consumed
    assert_eq!(engine.serial_mut().unwrap().pending_rx(), big.len() - 6);
}

#[test]
fn test_byte_at_a_time_delivery() {
    let clock = MockClock::new(0);
    let mut buf = [0u8; 64];
    let mut engine = started(&mut buf, &clock);

    let bytes = frame(0x0500, &command_payload(99, &[]));
    for &byte in &bytes[..bytes.len() - 1] {
        push(&mut engine, &[byte]);
        assert_eq!(engine.process(), Err(FrameError::Incomplete));
        clock.advance(5);
    }
    push(&mut engine, &bytes[bytes.len() - 1..]);
    assert!(matches!(engine.process(), Ok(Dispatch::Unknown { command: 99, .. })));
}

#[test]
fn test_back_to_back_frames_one_per_poll() {
    let clock = MockClock::new(0);
    let mut buf = [0u8; 64];
    let mut engine = started(&mut buf, &clock);

    push(&mut engine, &frame(INTENT_REGISTRATION_REQUEST, &[]));
    push(&mut engine, &frame(0x0700, &command_payload(5, &[])));

    assert_eq!(engine.process(), Ok(Dispatch::Registration));
    assert!(matches!(engine.process(), Ok(Dispatch::Unknown { command: 5, .. })));
    assert_eq!(engine.process(), Err(FrameError::Incomplete));
}

#[test]
fn test_stalled_frame_times_out_on_next_byte() {
    let clock = MockClock::new(1_000);
    let mut buf = [0u8; 64];
    let mut engine = started(&mut buf, &clock);

    push(&mut engine, &[0xC5, 0xC3, 0x01]);
    assert_eq!(engine.process(), Err(FrameError::Incomplete));

    clock.advance(1001);
    push(&mut engine, &[0x00]);
    assert_eq!(engine.process(), Err(FrameError::TimedOut));
    // The byte that revealed the timeout is still waiting
    assert_eq!(engine.serial_mut().unwrap().pending_rx(), 1);

    push(&mut engine, &frame(INTENT_REGISTRATION_REQUEST, &[]));
    assert_eq!(engine.process(), Ok(Dispatch::Registration));
}

#[test]
fn test_timeout_boundary_is_exclusive() {
    let clock = MockClock::new(0);
    let mut buf = [0u8; 64];
    let mut engine = started(&mut buf, &clock);

    let bytes = frame(INTENT_REGISTRATION_REQUEST, &[]);
    push(&mut engine, &bytes[..3]);
    assert_eq!(engine.process(), Err(FrameError::Incomplete));
    clock.advance(1000);
    push(&mut engine, &bytes[3..]);
    assert_eq!(engine.process(), Ok(Dispatch::Registration));
}

#[test]
fn test_reset_discards_in_flight_frame() {
    let clock = MockClock::new(0);
    let mut buf = [0u8; 64];
    let mut engine = started(&mut buf, &clock);

    let bytes = frame(0x0500, &command_payload(1, &[]));
    push(&mut engine, &bytes[..6]);
    assert_eq!(engine.process(), Err(FrameError::Incomplete));
    engine.reset();
    push(&mut engine, &frame(0x0500, &command_payload(8, &[])));
    assert!(matches!(engine.process(), Ok(Dispatch::Unknown { command: 8, .. })));
}

#[test]
fn test_read_into_caller_message() {
    let clock = MockClock::new(0);
    let mut buf = [0u8; 4];
    let mut engine = started(&mut buf, &clock);

    // Larger than the engine's own buffer, fits the caller's
    push(&mut engine, &frame(0x0800, b"Hello, hive"));
    let mut big = [0u8; 32];
    let mut msg = Message::new(&mut big, 0);
    assert_eq!(engine.read(&mut msg), Ok(0x0800));
    assert_eq!(msg.payload(), b"Hello, hive");
}

#[test]
fn test_write_message_frame() {
    let clock = MockClock::new(0);
    let mut buf = [0u8; 4];
    let mut engine = started(&mut buf, &clock);

    let mut out = [0u8; 16];
    let mut msg = Message::new(&mut out, 0);
    msg.start(0x0901);
    msg.put_u32(0xCAFEBABE).unwrap();
    msg.put_str("ok").unwrap();
    engine.write(&msg).unwrap();

    let mut payload = 0xCAFEBABEu32.to_le_bytes().to_vec();
    payload.extend_from_slice(&string_arg("ok"));
    assert_eq!(tx(&mut engine), frame(0x0901, &payload));
}

#[test]
fn test_detached_engine_reports_no_transport() {
    let clock = MockClock::new(0);
    let mut buf = [0u8; 16];
    let mut engine = started(&mut buf, &clock);
    let serial = engine.end().unwrap();
    assert_eq!(serial.flushes(), 1);

    let mut out = [0u8; 4];
    let mut msg = Message::new(&mut out, 0);
    assert_eq!(engine.read(&mut msg), Err(FrameError::NoTransport));
    assert_eq!(engine.process(), Err(FrameError::NoTransport));
}
