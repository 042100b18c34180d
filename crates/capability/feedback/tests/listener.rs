use domain::AssetKind;
use futures::{SinkExt, StreamExt};
use kio_feedback::{FloorHeightHandler, OutputListener, OutputListenerConfig};
use kio_storage::{
    FloorHeightStore, InMemoryFloorHeightStore, InMemoryMappingStore, MappingKey, MappingRecord,
    MappingStore,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};

async fn floor_handler() -> (Arc<FloorHeightHandler>, Arc<InMemoryFloorHeightStore>) {
    let mappings = Arc::new(InMemoryMappingStore::new());
    mappings
        .put(MappingRecord {
            key: MappingKey::new("p1", AssetKind::Floor, "12"),
            asset_id: 40,
        })
        .await
        .expect("put floor");
    let heights = Arc::new(InMemoryFloorHeightStore::new());
    (
        Arc::new(FloorHeightHandler::new(mappings, heights.clone())),
        heights,
    )
}

fn fast_retry(api_url: &str) -> OutputListenerConfig {
    let mut config = OutputListenerConfig::new(api_url, "secret-token");
    config.retry_delay = Duration::from_millis(10);
    config.max_retry_delay = Duration::from_millis(50);
    config
}

#[test]
fn listener_url_uses_websocket_scheme() {
    let config = OutputListenerConfig::new("https://eliona.example/api/v2/", "t");
    assert_eq!(
        config.listener_url(),
        "wss://eliona.example/api/v2/data-listener?dataSubtype=output"
    );
    let config = OutputListenerConfig::new("http://localhost:3000/v2", "t");
    assert_eq!(
        config.listener_url(),
        "ws://localhost:3000/v2/data-listener?dataSubtype=output"
    );
}

#[tokio::test]
async fn unreachable_endpoint_keeps_retrying() {
    let (handler, _) = floor_handler().await;
    let listener = OutputListener::new(fast_retry("http://127.0.0.1:1"));
    // 连接被拒后不退出，只在退避后重试
    let result = tokio::time::timeout(Duration::from_millis(300), listener.run(handler)).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn reconnects_after_server_closes() {
    let server = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = server.local_addr().expect("addr");
    let seen = Arc::new(Mutex::new(Vec::new()));

    let server_seen = seen.clone();
    let server_task = tokio::spawn(async move {
        for height in [2.5, 4.0] {
            let (tcp, _) = server.accept().await.expect("accept");
            let seen = server_seen.clone();
            let callback = move |request: &Request, response: Response| -> Result<Response, ErrorResponse> {
                let key = request
                    .headers()
                    .get("X-API-Key")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                seen.lock().expect("lock").push((request.uri().to_string(), key));
                Ok(response)
            };
            let mut ws = tokio_tungstenite::accept_hdr_async(tcp, callback)
                .await
                .expect("handshake");
            let payload = format!(
                r#"{{"assetId":40,"subtype":"output","data":{{"height":{}}}}}"#,
                height
            );
            ws.send(Message::Text(payload.into())).await.expect("send");
            ws.send(Message::Text("not json".into())).await.expect("send");
            ws.close(None).await.ok();
            while let Some(Ok(_)) = ws.next().await {}
        }
    });

    let (handler, heights) = floor_handler().await;
    let listener = OutputListener::new(fast_retry(&format!("http://{}", addr)));
    let client_task = tokio::spawn(async move { listener.run(handler).await });

    let updated = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if heights.get("12").await.expect("get") == Some(4.0) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    client_task.abort();
    server_task.await.expect("server");

    assert!(updated.is_ok());
    let seen = seen.lock().expect("lock").clone();
    assert_eq!(seen.len(), 2);
    for (uri, key) in seen {
        assert_eq!(uri, "/data-listener?dataSubtype=output");
        assert_eq!(key, "secret-token");
    }
}
