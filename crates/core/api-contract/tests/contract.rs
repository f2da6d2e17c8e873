use api_contract::{CollectPayload, LoginRequest, LoginResponse, MeasurementDto};
use serde_json::Value;

fn sample_payload() -> CollectPayload {
    CollectPayload {
        measurements: vec![MeasurementDto {
            value: 21.5,
            timestamp: "2024-05-06T07:08:09Z".to_string(),
        }],
        name: "RETURN_TEMPERATURE".to_string(),
        host_device: 2013009,
        device: 2013000,
        log: 28.0,
        point: "AV-2".to_string(),
        id_equipment: 3,
        id_parameter: 4,
        measurement: "RETURN_TEMPERATURE".to_string(),
    }
}

#[test]
fn collect_payload_uses_wire_field_names() {
    let value = serde_json::to_value(sample_payload()).expect("serialize");
    assert_eq!(value["hostDevice"], 2013009);
    assert!(value.get("host_device").is_none());
    assert_eq!(value["id_equipment"], 3);
    assert_eq!(value["id_parameter"], 4);
    assert_eq!(value["measurement"], "RETURN_TEMPERATURE");
    assert_eq!(value["measurements"][0]["timestamp"], "2024-05-06T07:08:09Z");
    assert_eq!(value["measurements"][0]["value"], 21.5);
    assert!(value["log"].is_i64());
    assert_eq!(value["log"], 28);
    let keys = value.as_object().expect("object").len();
    assert_eq!(keys, 9);
}

#[test]
fn login_request_has_email_and_password() {
    let req = LoginRequest {
        email: "ops@example.com".to_string(),
        password: "pw".to_string(),
    };
    let value = serde_json::to_value(req).expect("serialize");
    assert_eq!(value, serde_json::json!({"email": "ops@example.com", "password": "pw"}));
}

#[test]
fn login_response_reads_data_field() {
    let resp: LoginResponse = serde_json::from_str(r#"{"data":"token-1","message":"ok"}"#)
        .expect("parse");
    assert_eq!(resp.data.as_deref(), Some("token-1"));
}

#[test]
fn login_response_without_data_is_none() {
    let resp: LoginResponse = serde_json::from_str(r#"{"message":"ok"}"#).expect("parse");
    assert!(resp.data.is_none());
    let value: Value = serde_json::to_value(resp).expect("serialize");
    assert!(value["data"].is_null());
}

#[test]
fn fractional_log_stays_a_float() {
    let mut payload = sample_payload();
    payload.log = 12.5;
    let value = serde_json::to_value(&payload).expect("serialize");
    assert_eq!(value["log"], 12.5);

    let back: CollectPayload = serde_json::from_value(serde_json::json!({
        "measurements": [],
        "name": "n",
        "hostDevice": 1,
        "device": 2,
        "log": 12,
        "point": "AV-1",
        "id_equipment": 3,
        "id_parameter": 4,
        "measurement": "n"
    }))
    .expect("deserialize");
    assert_eq!(back.log, 12.0);
}
