use gelf_log_sink::{CodecError, GelfSettings, LogWrite, Message, Parts, Severity};
use serde_json::{json, Value};

fn write(payload: &str) -> LogWrite {
    LogWrite::new("db-3", "inventory", "/srv/inventory/src/stock.rs", 117, payload)
}

fn encode(message: &Message) -> Value {
    serde_json::from_slice(&message.to_bytes().unwrap()).unwrap()
}

#[test]
fn extended_line_end_to_end() {
    let message = Message::build(&write("0a1|mypkg|mypkg|DoThing|INFO|hello\nworld"));
    assert_eq!(message.short, "hello");
    assert_eq!(message.full, "hello\nworld");
    assert_eq!(message.level, 6);
    assert_eq!(message.extra["_function"], json!("DoThing"));

    let value = encode(&message);
    let object = value.as_object().unwrap();
    assert_eq!(object["version"], json!("1.1"));
    assert_eq!(object["host"], json!("db-3"));
    assert_eq!(object["short_message"], json!("hello"));
    assert_eq!(object["full_message"], json!("hello\nworld"));
    assert_eq!(object["level"], json!(6));
    assert!(object["timestamp"].is_f64());
    assert_eq!(object["_file"], json!("stock"));
    assert_eq!(object["_filename"], json!("/srv/inventory/src/stock.rs"));
    assert_eq!(object["_line"], json!(117));
    assert!(object["_pid"].is_u64());
    assert!(object.get("extra").is_none());
    assert!(object.get("facility").is_none());
}

#[test]
fn legacy_line_end_to_end() {
    let value = encode(&Message::build(&write("00c|Reserve|CRIT|out of stock")));
    assert_eq!(value["short_message"], json!("out of stock"));
    assert!(value.get("full_message").is_none());
    assert_eq!(value["level"], json!(2));
    assert_eq!(value["_function"], json!("Reserve"));
    assert_eq!(value["_id"], json!("00c"));
    assert_eq!(value["_module"], json!(""));
    assert_eq!(value["_pkg"], json!(""));
}

#[test]
fn malformed_line_still_encodes() {
    let message = Message::build(&write("no delimiters here"));
    assert_eq!(Parts::parse(b"no delimiters here"), Parts::default());

    let value = encode(&message);
    assert_eq!(value["short_message"], json!(""));
    assert!(value.get("level").is_none());
    assert_eq!(value["_app"], json!("inventory"));
}

#[test]
fn every_token_maps_to_its_severity() {
    let table = [
        ("DEBU", 7),
        ("INFO", 6),
        ("NOTI", 5),
        ("WARN", 4),
        ("ERRO", 3),
        ("CRIT", 2),
        ("FATA", 0),
    ];
    for (token, level) in table {
        let message = Message::build(&write(&format!("1|f|{token}|msg")));
        assert_eq!(message.level, level, "{token}");
        assert_eq!(Severity::from_token(token).as_i32(), level);
    }
}

#[test]
fn caller_metadata_wins_in_encoded_output() {
    let write = write("1|m|p|f|INFO|msg")
        .with_meta("_function", "overridden")
        .with_meta("_line", "not-a-number")
        .with_meta("_request", "r-9");

    let value = encode(&Message::build(&write));
    assert_eq!(value["_function"], json!("overridden"));
    assert_eq!(value["_line"], json!("not-a-number"));
    assert_eq!(value["_request"], json!("r-9"));
}

#[test]
fn round_trip_keeps_fixed_fields_and_extra_keys() {
    let message = Message::build(&write("1f|m|p|f|NOTI|first\nsecond").with_meta("_tenant", "acme"));
    let decoded = Message::from_slice(&message.to_bytes().unwrap()).unwrap();

    assert_eq!(decoded.version, message.version);
    assert_eq!(decoded.host, message.host);
    assert_eq!(decoded.short, message.short);
    assert_eq!(decoded.full, message.full);
    assert_eq!(decoded.time_unix, message.time_unix);
    assert_eq!(decoded.level, message.level);
    assert_eq!(decoded.facility, message.facility);
    for (key, value) in &message.extra {
        assert_eq!(decoded.extra.get(key), Some(value), "{key}");
    }
}

#[test]
fn decode_ignores_unprefixed_unknown_keys() {
    let decoded = Message::from_slice(br#"{"host":"h","container":"c","_container":"c"}"#).unwrap();
    assert_eq!(decoded.extra.len(), 1);
    assert!(decoded.extra.contains_key("_container"));
}

#[test]
fn decode_stops_at_type_mismatch() {
    let err = Message::from_slice(br#"{"short_message":["not","text"]}"#).unwrap_err();
    assert!(matches!(err, CodecError::InvalidType { ref field } if field == "short_message"));
}

#[test]
fn settings_seed_writes() {
    let settings = GelfSettings {
        host_name: "edge-2".into(),
        facility: "gateway".into(),
        version: Some("6-field".into()),
        ..Default::default()
    };
    let value = encode(&Message::build(&settings.log_write("src/route.rs", 9, "2|gw|route|Match|ERRO|no route")));
    assert_eq!(value["host"], json!("edge-2"));
    assert_eq!(value["_app"], json!("gateway"));
    assert_eq!(value["_version"], json!("6-field"));
    assert_eq!(value["level"], json!(3));
}
