mod common;

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

const SELECT_PPSE: &str = "00A4040007A00000000306";

async fn send_apdu(client: &Client, addr: &str, command: Value) -> String {
    let response = client
        .post(format!("{addr}/apdu"))
        .json(&json!({ "command": command }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    body["response"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_replays_delimited_file_in_order() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("ppse.txt"),
        format!("{SELECT_PPSE};90\n{SELECT_PPSE};6A82\n"),
    )
    .unwrap();
    let server = common::spawn_server(dir.path()).await;
    let client = Client::new();

    let loaded: Value = client
        .post(format!("{}/transcript/file", server.addr))
        .json(&json!({ "file": "ppse.txt" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(loaded, json!({ "pairs": 2, "commands": 1 }));

    assert_eq!(send_apdu(&client, &server.addr, json!(SELECT_PPSE)).await, "90");
    assert_eq!(send_apdu(&client, &server.addr, json!(SELECT_PPSE)).await, "6a82");
    assert_eq!(send_apdu(&client, &server.addr, json!(SELECT_PPSE)).await, "6f00");

    let log = client
        .get(format!("{}/log", server.addr))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(
        log,
        "Received command: 00a4040007a00000000306\n\n     Sent response: 90\
         \n\nReceived command: 00a4040007a00000000306\n\n     Sent response: AID not found\
         \n\nReceived command: 00a4040007a00000000306\n\n     Sent response: Failure"
    );
}

#[tokio::test]
async fn test_inline_transcript_replaces_previous_one() {
    let dir = tempfile::tempdir().unwrap();
    let server = common::spawn_server(dir.path()).await;
    let client = Client::new();

    for body in [
        r#"[{"commands":["00A4"],"responses":["9000"]}]"#,
        r#"[{"commands":["00B0"],"responses":["9000"]}]"#,
    ] {
        let response = client
            .post(format!("{}/transcript", server.addr))
            .body(body)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(send_apdu(&client, &server.addr, json!("00a4")).await, "6f00");
    assert_eq!(send_apdu(&client, &server.addr, json!("00b0")).await, "9000");
    assert_eq!(send_apdu(&client, &server.addr, Value::Null).await, "6f00");

    let status: Value = client
        .get(format!("{}/status", server.addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["snoop_file"], Value::Null);
    assert_eq!(status["commands"], 1);
    assert_eq!(status["pending_responses"], 0);
    assert!(
        status["transaction_log"]
            .as_str()
            .unwrap()
            .ends_with("Received null command")
    );
}

#[tokio::test]
async fn test_deactivation_and_polling_frames_are_logged() {
    let dir = tempfile::tempdir().unwrap();
    let server = common::spawn_server(dir.path()).await;
    let client = Client::new();

    let response = client
        .post(format!("{}/polling-frames", server.addr))
        .json(&json!({ "frames": ["A"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    for reason in [json!("LINK_LOSS"), json!(1)] {
        let response = client
            .post(format!("{}/deactivate", server.addr))
            .json(&json!({ "reason": reason }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    assert_eq!(
        server.engine.current_log(),
        "Received polling frame A\
         \n\nService has been deactivated due to NFC link loss\
         \n\nService has been deactivated due to a different AID being selected"
    );
}

#[tokio::test]
async fn test_error_responses() {
    let dir = tempfile::tempdir().unwrap();
    let server = common::spawn_server(dir.path()).await;
    let client = Client::new();

    let response = client
        .post(format!("{}/apdu", server.addr))
        .json(&json!({ "command": "xyz" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().starts_with("Command is not a hex string"));

    let response = client
        .post(format!("{}/transcript/file", server.addr))
        .json(&json!({ "file": "missing.txt" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = client
        .post(format!("{}/transcript/file", server.addr))
        .json(&json!({ "file": "../etc/passwd" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Failed requests never reach the transaction log
    assert_eq!(server.engine.current_log(), "");
}
