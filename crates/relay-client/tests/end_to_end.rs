//! Client against a real relay server.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use relay_client::{ClientConfig, ClientExit};
use relay_server::config::ServerConfig;
use relay_server::server::RelayServer;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;

const TIMEOUT: Duration = Duration::from_secs(5);

async fn boot_server() -> (ClientConfig, RelayServer) {
    let server = RelayServer::new(ServerConfig {
        host: "127.0.0.1".into(),
        port: 0,
    });
    let (addr, _handle) = server.listen().await.unwrap();
    let config = ClientConfig {
        host: "127.0.0.1".into(),
        port: addr.port(),
        ..ClientConfig::default()
    };
    (config, server)
}

async fn wait_for_connections(server: &RelayServer, n: usize) {
    timeout(TIMEOUT, async {
        while server.hub().connection_count().await != n {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("hub never reached {n} connections"));
}

async fn next_text(ws: &mut relay_client::WsStream) -> String {
    loop {
        let frame = timeout(TIMEOUT, ws.next())
            .await
            .expect("no message before timeout")
            .expect("stream ended")
            .expect("read failed");
        if let Message::Text(text) = frame {
            let value: serde_json::Value = serde_json::from_str(text.as_str()).unwrap();
            return value["text"].as_str().unwrap().to_owned();
        }
    }
}

#[tokio::test]
async fn stdin_lines_reach_other_clients_without_blanks() {
    let (config, server) = boot_server().await;
    let mut listener = relay_client::connect(&config).await.unwrap();
    wait_for_connections(&server, 1).await;

    let sender = relay_client::connect(&config).await.unwrap();
    wait_for_connections(&server, 2).await;
    let exit = timeout(
        TIMEOUT,
        relay_client::relay(sender, &b"hello\n\n\nworld\n"[..], tokio::io::sink()),
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(exit, ClientExit::InputExhausted);

    assert_eq!(next_text(&mut listener).await, "hello");
    assert_eq!(next_text(&mut listener).await, "world");
    // Next is the sender's disconnect notice, not an empty message
    assert_eq!(next_text(&mut listener).await, "connection closed");
}

#[tokio::test]
async fn relayed_messages_are_printed() {
    let (config, server) = boot_server().await;
    let client = relay_client::connect(&config).await.unwrap();

    // Keep input open so the client only stops when we say so
    let (mut input_tx, input_rx) = tokio::io::duplex(1024);
    let (output_tx, output_rx) = tokio::io::duplex(1024);
    let running = tokio::spawn(relay_client::relay(
        client,
        BufReader::new(input_rx),
        output_tx,
    ));

    let mut peer = relay_client::connect(&config).await.unwrap();
    wait_for_connections(&server, 2).await;
    peer.send(Message::text(r#"{"text":"from peer"}"#))
        .await
        .unwrap();

    let mut printed = BufReader::new(output_rx).lines();
    let line = timeout(TIMEOUT, printed.next_line())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(line.as_deref(), Some("from peer"));

    input_tx.shutdown().await.unwrap();
    drop(input_tx);
    let exit = timeout(TIMEOUT, running).await.unwrap().unwrap().unwrap();
    assert_eq!(exit, ClientExit::InputExhausted);
}

#[tokio::test]
async fn server_shutdown_ends_client() {
    let (config, server) = boot_server().await;
    let client = relay_client::connect(&config).await.unwrap();
    wait_for_connections(&server, 1).await;

    let (_input_tx, input_rx) = tokio::io::duplex(64);
    let running = tokio::spawn(relay_client::relay(
        client,
        BufReader::new(input_rx),
        tokio::io::sink(),
    ));

    assert!(server.drain(Some(TIMEOUT)).await);
    let exit = timeout(TIMEOUT, running).await.unwrap().unwrap().unwrap();
    assert_eq!(exit, ClientExit::ConnectionClosed);
}
