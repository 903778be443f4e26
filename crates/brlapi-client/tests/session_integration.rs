//! Integration tests for connection lifecycle, parameter access and the
//! protocol error kinds, driven through the public API against
//! `MockTransport`.

use std::sync::Arc;
use std::thread;

use brlapi_client::{
    tool, ApiException, ClientError, Connection, ConnectionHandle, ConnectionHandleRegistry,
    ConnectionSettings, ErrorCode, MockTransport, ParameterId, ParameterValue, TransportCall,
};
use brlapi_core::parse::ParseError;
use brlapi_core::ValueError;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn settings() -> ConnectionSettings {
    ConnectionSettings::parse("localhost:1", "none").expect("valid settings")
}

// ── Registry lifecycle ────────────────────────────────────────────────────────

#[test]
fn test_registry_tracks_connection_from_open_to_close() {
    init_tracing();

    // Arrange
    let transport = Arc::new(MockTransport::new().with_handle(0x51));

    // Act
    let connection = Connection::open(transport.clone(), &settings()).expect("open");
    let registered = ConnectionHandleRegistry::global().lookup(ConnectionHandle(0x51));

    // Assert
    let registered = registered.expect("registered after open");
    assert!(Arc::ptr_eq(&registered, connection.state()));
    assert_eq!(connection.settings().host.tcp_port(), Some(4102));

    connection.close().expect("first close");
    assert!(ConnectionHandleRegistry::global()
        .lookup(ConnectionHandle(0x51))
        .is_none());

    let calls_before = transport.calls();
    connection.close().expect("second close");
    assert_eq!(transport.calls(), calls_before);
    assert!(connection.is_closed());
    assert!(!connection.is_unusable());
}

// ── Asynchronous exceptions ───────────────────────────────────────────────────

#[test]
fn test_exception_from_transport_marks_connection_unusable() {
    init_tracing();

    // Arrange
    let transport = Arc::new(MockTransport::new());
    let connection = Connection::open(transport.clone(), &settings()).expect("open");
    transport.raise_exception_next(ErrorCode::InvalidParameter, 0x50);

    // Act
    let result = connection
        .parameters()
        .get_by_id(ParameterId::DeviceSpeed)
        .get();

    // Assert
    match result {
        Err(ClientError::Exception(exception)) => {
            assert_eq!(exception.handle(), connection.handle());
            assert_eq!(exception.code(), ErrorCode::InvalidParameter);
            assert_eq!(exception.packet_type(), 0x50);
            assert!(exception.connection().expect("registered").is_unusable());
        }
        other => panic!("expected an exception, got {other:?}"),
    }
    assert!(connection.is_unusable());
    assert!(!connection.is_closed());

    // An unusable connection can still be closed.
    connection.close().expect("close");
    assert!(connection.is_closed());
}

#[test]
fn test_exception_built_on_foreign_thread_marks_connection() {
    init_tracing();

    let transport = Arc::new(MockTransport::new());
    let connection = Connection::open(transport, &settings()).expect("open");
    let handle = connection.handle();

    let worker = thread::spawn(move || ApiException::new(handle, ErrorCode::DriverError, 0x77, vec![0xFF]));
    let exception = worker.join().expect("worker");

    assert!(connection.is_unusable());
    assert_eq!(exception.packet(), &[0xFF]);

    // A second report leaves the flag set.
    let _ = ApiException::new(handle, ErrorCode::DriverError, 0x77, Vec::new());
    assert!(connection.is_unusable());
}

#[test]
fn test_exception_after_close_marks_nothing() {
    let transport = Arc::new(MockTransport::new());
    let connection = Connection::open(transport, &settings()).expect("open");
    let handle = connection.handle();
    connection.close().expect("close");

    let exception = ApiException::new(handle, ErrorCode::EndOfFile, 0, Vec::new());

    assert!(exception.connection().is_none());
    assert!(!connection.is_unusable());
}

// ── Local validation ──────────────────────────────────────────────────────────

#[test]
fn test_out_of_range_value_fails_before_transport() {
    init_tracing();

    // Arrange
    let transport = Arc::new(MockTransport::new());
    let connection = Connection::open(transport.clone(), &settings()).expect("open");
    let priority = connection.parameters().get("client-priority").expect("known");

    // Act
    let rejected = priority.set_text("150");
    let accepted = priority.set_text("50");

    // Assert
    assert!(matches!(
        rejected,
        Err(ClientError::InvalidValue {
            source: ValueError::Parse(ParseError::TooLarge { maximum: 100, .. }),
            ..
        })
    ));
    let sets: Vec<TransportCall> = transport
        .calls()
        .into_iter()
        .filter(|call| matches!(call, TransportCall::Set { .. }))
        .collect();
    assert_eq!(
        sets,
        vec![TransportCall::Set {
            handle: connection.handle(),
            parameter: ParameterId::ClientPriority,
            subparam: 0,
            global: false,
            value: ParameterValue::Int(50),
        }]
    );
    assert!(accepted.is_ok());
    assert!(!connection.is_unusable());
}

#[test]
fn test_unknown_parameter_name_is_local() {
    let transport = Arc::new(MockTransport::new());
    let connection = Connection::open(transport.clone(), &settings()).expect("open");

    let error = tool::set_parameter(&connection, "volume", "3").unwrap_err();

    assert!(error.is_local());
    assert_eq!(transport.set_count(), 0);
}

// ── Round trip ────────────────────────────────────────────────────────────────

#[test]
fn test_round_trip_cursor_blink_period() {
    init_tracing();

    // Arrange
    let transport = Arc::new(MockTransport::new().with_handle(7));
    let requested = settings();

    // Act
    let connection = Connection::open(transport.clone(), &requested).expect("open");
    tool::set_parameter(&connection, "cursor-blink-period", "750").expect("set");
    let value = connection
        .parameters()
        .get("cursor-blink-period")
        .expect("known")
        .get()
        .expect("get");

    // Assert
    assert_eq!(connection.handle(), ConnectionHandle(7));
    assert_eq!(connection.settings(), &requested);
    assert_eq!(value, Some(ParameterValue::Int(750)));
    assert!(!connection.is_unusable());

    connection.close().expect("close");
    assert!(ConnectionHandleRegistry::global()
        .lookup(ConnectionHandle(7))
        .is_none());
}

#[test]
fn test_listing_renders_current_values() {
    let transport = Arc::new(MockTransport::new());
    transport.put_value(ParameterId::DeviceOnline, 0, true, ParameterValue::Boolean(true));
    transport.put_value(ParameterId::ServerVersion, 0, true, ParameterValue::Int(8));

    let listing = Connection::scoped(transport.clone(), &settings(), |connection| {
        tool::list_parameters(connection, false)
    })
    .expect("listing");

    let online = listing
        .iter()
        .find(|entry| entry.name == "device-online")
        .expect("listed");
    assert_eq!(online.value.as_deref(), Some("yes"));
    assert!(matches!(transport.calls().last(), Some(TransportCall::Close { .. })));
}
