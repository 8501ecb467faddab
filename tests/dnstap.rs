use bytes::{Bytes, BytesMut};
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use prost::Message as _;
use rustdnstap::dnstap::MessageType;
use rustdnstap::event::{Codec, Config, Event, RawFrame, Value};
use rustdnstap::fstrm::{encode_data_frame, ControlFrame, ControlType, Decoder, Frame};
use rustdnstap::proto;
use serde::Deserialize;
use std::fs;
use std::net::IpAddr;
use std::str::FromStr;

const TEST_DATA_FILENAME: &str = "tests/test_data.yaml";

#[derive(Deserialize)]
struct TestCase {
    // Name of the test case.
    name: String,

    // dnstap message type, e.g. CLIENT_QUERY.
    r#type: String,

    query_address: String,

    // Hex encoded DNS message.
    binary: String,

    // Expected event summary, or None if the frame should be dropped.
    summary: Option<String>,

    rcode: Option<String>,
}

fn load_tests() -> Vec<TestCase> {
    let s = fs::read(TEST_DATA_FILENAME).expect("failed read test input");
    serde_yaml::from_slice(&s).expect("failed to deserialise test input")
}

/// Wraps the case's DNS message in a framed dnstap message.
fn frame(case: &TestCase) -> Vec<u8> {
    let r#type = match MessageType::from_str(&case.r#type) {
        Err(e) => panic!("{}: Invalid message type: {}", case.name, e),
        Ok(t) => t,
    };
    let binary = match hex::decode(&case.binary) {
        Err(e) => panic!("{}: Invalid test case input: {}", case.name, e),
        Ok(b) => b,
    };
    let address = match case.query_address.parse::<IpAddr>() {
        Err(e) => panic!("{}: Invalid query address: {}", case.name, e),
        Ok(IpAddr::V4(ip)) => ip.octets().to_vec(),
        Ok(IpAddr::V6(ip)) => ip.octets().to_vec(),
    };

    let mut message = proto::Message {
        r#type: r#type as i32,
        query_address: Some(address),
        query_port: Some(53000),
        query_time_sec: Some(1_623_456_789),
        query_time_nsec: Some(250_000_000),
        response_time_sec: Some(1_623_456_789),
        response_time_nsec: Some(262_500_000),
        ..Default::default()
    };
    if case.r#type.ends_with("_QUERY") {
        message.query_message = Some(binary);
    } else {
        message.response_message = Some(binary);
    }

    let dnstap = proto::Dnstap {
        identity: Some(b"ns1.example.net".to_vec()),
        message: Some(message),
        r#type: proto::dnstap::Type::Message as i32,
        ..Default::default()
    };

    let mut buf = BytesMut::new();
    encode_data_frame(&dnstap.encode_to_vec(), &mut buf);
    buf.to_vec()
}

/// Decodes `stream` delivered `chunk` bytes at a time, returning one result
/// per data frame and every control frame reply.
fn decode_stream(stream: &[u8], chunk: usize) -> (Vec<Option<Event>>, Vec<Bytes>) {
    let codec = Codec::new(Config::default());
    let received = Utc.timestamp_opt(0, 0).unwrap();

    let mut decoder = Decoder::new();
    let mut events = Vec::new();
    let mut replies = Vec::new();

    for bytes in stream.chunks(chunk) {
        for frame in decoder.push(bytes).expect("protocol error") {
            match frame {
                Frame::Control(control) => {
                    if let Some(reply) = control.reply() {
                        replies.push(reply.to_bytes());
                    }
                }
                Frame::Data(payload) => {
                    let frame = RawFrame::new(payload, received, Some("ns1".to_string()));
                    events.push(codec.decode(&frame));
                }
            }
        }
    }

    assert!(decoder.is_empty(), "left over bytes in the decoder");
    (events, replies)
}

#[test]
fn tests() {
    let tests = load_tests();

    let ready = ControlFrame::new(
        ControlType::Ready,
        Bytes::from_static(b"\0\0\0\x01\0\0\0\x16protobuf:dnstap.Dnstap"),
    );
    let start = ControlFrame::new(ControlType::Start, Bytes::new());
    let stop = ControlFrame::new(ControlType::Stop, Bytes::new());

    let mut stream = ready.to_bytes().to_vec();
    stream.extend_from_slice(&start.to_bytes());
    for case in &tests {
        stream.extend(frame(case));
    }
    stream.extend_from_slice(&stop.to_bytes());

    // The events must not depend on how the stream was split up.
    for chunk in &[stream.len(), 1, 3, 7, 64] {
        let (events, replies) = decode_stream(&stream, *chunk);

        assert_eq!(
            replies,
            vec![ControlFrame::new(ControlType::Accept, ready.fields.clone()).to_bytes()],
            "chunk size {}",
            chunk
        );
        assert_eq!(events.len(), tests.len(), "chunk size {}", chunk);

        for (case, event) in tests.iter().zip(events) {
            test_event(case, event);
        }
    }
}

fn test_event(case: &TestCase, event: Option<Event>) {
    let event = match (&case.summary, event) {
        (None, None) => return,
        (None, Some(event)) => panic!("{}: Expected no event, got {:?}", case.name, event),
        (Some(_), None) => panic!("{}: Expected an event, got none", case.name),
        (Some(_), Some(event)) => event,
    };

    assert_eq!(Some(&event.message), case.summary.as_ref(), "{}: Summary doesn't match", case.name);
    assert_eq!(event.source, "ns1");
    assert_eq!(
        event.field("dnstap_rcode"),
        case.rcode.as_ref().map(|r| Value::Str(r.clone())).as_ref(),
        "{}: Rcode doesn't match",
        case.name
    );
    assert_eq!(
        event.field("dnstap_query_addr"),
        Some(&Value::Str(case.query_address.clone()))
    );
    assert_eq!(event.field("dnstap_type"), Some(&Value::Str(case.r#type.clone())));

    let wire_len = case.binary.len() / 2;
    assert_eq!(event.field("dnstap_size"), Some(&Value::Int(wire_len as i64)));

    if case.r#type.ends_with("_RESPONSE") {
        assert_eq!(event.field("dnstap_exec_time"), Some(&Value::Int(12_500_000)));
        assert_eq!(event.timestamp.timestamp_millis(), 1_623_456_789_263);
    } else {
        assert_eq!(event.field("dnstap_exec_time"), None);
        assert_eq!(event.timestamp.timestamp_millis(), 1_623_456_789_250);
    }

    let full_message = event.full_message.expect("full message");
    assert!(
        full_message.starts_with(";; ->>HEADER<<- opcode: QUERY"),
        "{}: Unexpected full message {}",
        case.name,
        full_message
    );
}
