use bytes::Bytes;
use micro_wire::connection::MessageReader;
use micro_wire::protocol::{BodyError, ErrorClass, OutgoingMessage, ParseError, SendError};

async fn serialize(message: &mut OutgoingMessage) -> Vec<u8> {
    let mut wire = Vec::new();
    message.write_to(&mut wire).await.unwrap();
    wire
}

#[tokio::test]
async fn round_trip_preserves_message() {
    let body = Bytes::from_static(b"some body bytes\r\n\r\nwith blank lines");
    let mut message = OutgoingMessage::builder("HTTP/1.1 201 Created")
        .header("X-Request-Id", "42")
        .header("Set-Cookie", "a=1")
        .header("Set-Cookie", "b=2")
        .body(body.clone())
        .unwrap();
    let wire = serialize(&mut message).await;

    let mut reader = MessageReader::new(&wire[..]);
    let mut parsed = reader.read_message().await.unwrap().unwrap();

    assert_eq!(parsed.head(), message.head());
    assert_eq!(parsed.content_length(), Some(body.len() as u64));
    assert_eq!(parsed.body_mut().read_to_bytes().await.unwrap(), body);
}

#[tokio::test]
async fn round_trip_over_varied_messages() {
    let cases: [(&str, &[(&str, &str)], &[u8]); 6] = [
        ("GET / HTTP/1.0", &[("user-agent", "x"), ("accept", "*/*")], b"Hello"),
        ("PING", &[], b""),
        ("PONG", &[], b"!"),
        ("HTTP/1.1 200 OK", &[("x-trace", "a"), ("X-TRACE", "b")], b"\r\n\r\n"),
        ("PUT /blob WIRE/1.0", &[("Content-Type", "application/octet-stream")], b"head\r\n\r\nNot-A-Header: 1\r\n"),
        ("", &[("X-Empty-Status", "yes")], b"0"),
    ];

    for (status_line, headers, body) in cases {
        let mut message = headers
            .iter()
            .fold(OutgoingMessage::builder(status_line), |builder, (name, value)| builder.header(name, value))
            .body(Bytes::copy_from_slice(body))
            .unwrap();
        let wire = serialize(&mut message).await;

        let mut reader = MessageReader::new(&wire[..]);
        let mut parsed = reader.read_message().await.unwrap().unwrap();

        assert_eq!(parsed.head(), message.head(), "status line {status_line:?}");
        assert_eq!(parsed.status_line(), status_line);
        assert_eq!(parsed.content_length(), Some(body.len() as u64));
        assert_eq!(parsed.total_len(), wire.len() as u64);
        assert_eq!(parsed.body_mut().read_to_bytes().await.unwrap(), body);
    }
}

#[tokio::test]
async fn lower_case_names_are_canonical_after_round_trip() {
    let mut message = OutgoingMessage::builder("PING").header("x-request-id", "7").body("a").unwrap();
    let wire = serialize(&mut message).await;
    assert_eq!(wire, b"PING\r\nContent-Length: 1\r\nX-Request-Id: 7\r\n\r\na");

    let mut reader = MessageReader::new(&wire[..]);
    let parsed = reader.read_message().await.unwrap().unwrap();
    assert_eq!(parsed.headers().get("X-REQUEST-ID"), Some("7"));
}

#[tokio::test]
async fn absent_length_stays_absent() {
    let mut message = OutgoingMessage::builder("NOTIFY").header("X-Kind", "ping").empty().unwrap();
    let wire = serialize(&mut message).await;
    assert_eq!(wire, b"NOTIFY\r\nX-Kind: ping\r\n\r\n");

    let mut reader = MessageReader::new(&wire[..]);
    let mut parsed = reader.read_message().await.unwrap().unwrap();

    assert_eq!(parsed.content_length(), None);
    assert!(!parsed.head().has_content_length());
    assert!(parsed.body_mut().read_to_bytes().await.unwrap().is_empty());
}

#[tokio::test]
async fn zero_length_body() {
    let mut message = OutgoingMessage::builder("HTTP/1.1 200 OK").body(Bytes::new()).unwrap();
    let wire = serialize(&mut message).await;
    assert!(wire.ends_with(b"Content-Length: 0\r\n\r\n"));

    let mut reader = MessageReader::new(&wire[..]);
    let mut parsed = reader.read_message().await.unwrap().unwrap();

    assert_eq!(parsed.content_length(), Some(0));
    assert!(parsed.body_mut().read_to_bytes().await.unwrap().is_empty());
}

#[tokio::test]
async fn short_body_is_reported() {
    let input: &[u8] = b"POST /kv HTTP/1.1\r\nContent-Length: 12\r\n\r\nHello";
    let mut reader = MessageReader::new(input);
    let mut parsed = reader.read_message().await.unwrap().unwrap();

    let err = parsed.body_mut().read_to_bytes().await.unwrap_err();
    assert!(matches!(err, BodyError::Incomplete { expected: 12, actual: 5 }));
    assert_eq!(err.class(), ErrorClass::BodyLength);
}

#[tokio::test]
async fn short_body_copy_is_reported() {
    let input: &[u8] = b"POST /kv HTTP/1.1\r\nContent-Length: 12\r\n\r\nHello";
    let mut reader = MessageReader::new(input);
    let mut parsed = reader.read_message().await.unwrap().unwrap();

    let err = parsed.write_to(&mut Vec::new()).await.unwrap_err();
    assert!(matches!(err, SendError::Body { source: BodyError::Incomplete { expected: 12, actual: 5 } }));
}

#[tokio::test]
async fn malformed_header_line() {
    let input: &[u8] = b"GET / HTTP/1.1\r\nNoColonHere\r\n\r\n";
    let mut reader = MessageReader::new(input);

    let err = reader.read_message().await.unwrap_err();
    assert!(matches!(err, ParseError::MalformedHeader { ref line } if line == "NoColonHere"));
    assert_eq!(err.class(), ErrorClass::Framing);
}

#[tokio::test]
async fn body_is_consumed_once() {
    let input: &[u8] = b"POST / HTTP/1.1\r\nContent-Length: 3\r\n\r\nabc";
    let mut reader = MessageReader::new(input);
    let mut parsed = reader.read_message().await.unwrap().unwrap();

    let mut first = Vec::new();
    parsed.write_to(&mut first).await.unwrap();

    let mut second = Vec::new();
    let err = parsed.write_to(&mut second).await.unwrap_err();
    assert!(matches!(err, SendError::Body { source: BodyError::AlreadyConsumed }));
    assert_eq!(err.class(), ErrorClass::Reuse);
    assert!(second.is_empty());

    assert!(matches!(parsed.body_mut().read_to_bytes().await, Err(BodyError::AlreadyConsumed)));
}

#[tokio::test]
async fn parses_request_with_body() {
    let input = "GET / HTTP/1.0\r\nUser-Agent: x\r\nAccept: */*\r\nContent-Length: 5\r\n\r\nHello";
    let mut reader = MessageReader::new(input.as_bytes());
    let mut parsed = reader.read_message().await.unwrap().unwrap();

    assert_eq!(parsed.status_line(), "GET / HTTP/1.0");
    assert_eq!(parsed.headers().get("User-Agent"), Some("x"));
    assert_eq!(parsed.headers().get("Accept"), Some("*/*"));
    assert_eq!(parsed.headers().get("Content-Length"), Some("5"));
    assert_eq!(parsed.headers().len(), 3);
    assert_eq!(parsed.content_length(), Some(5));
    assert_eq!(parsed.head_len(), "GET / HTTP/1.0\r\n".len() + "User-Agent: x\r\n".len() + "Accept: */*\r\n".len() + "Content-Length: 5\r\n".len() + 2);
    assert_eq!(parsed.total_len(), input.len() as u64);
    assert_eq!(parsed.body_mut().read_to_bytes().await.unwrap(), "Hello");
}

#[tokio::test]
async fn parses_bare_status_line() {
    let mut reader = MessageReader::new(&b"PING\r\n\r\n"[..]);
    let mut parsed = reader.read_message().await.unwrap().unwrap();

    assert_eq!(parsed.status_line(), "PING");
    assert!(parsed.headers().is_empty());
    assert_eq!(parsed.content_length(), None);
    assert_eq!(parsed.body_mut().len(), 0);
    assert!(parsed.body_mut().read_to_bytes().await.unwrap().is_empty());

    let err = parsed.head().request_line().unwrap_err();
    assert_eq!(err.class(), ErrorClass::Validation);
}

#[tokio::test]
async fn premature_end_of_head() {
    let mut reader = MessageReader::new(&b"GET / HTTP/1.1\r\nHost: a\r\n"[..]);

    let err = reader.read_message().await.unwrap_err();
    assert!(matches!(err, ParseError::IncompleteHead { .. }));
    assert_eq!(err.class(), ErrorClass::Framing);
}
