use std::net::SocketAddr;
use std::time::Duration;

use reqwest::StatusCode;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

use services::{ChatCompletionsSource, GenerationSource, GeneratorConfig, SupplyError};

fn source_for(addr: SocketAddr, timeout: Duration) -> ChatCompletionsSource {
    let mut config = GeneratorConfig::new("test-key");
    config.base_url = format!("http://{addr}/v1");
    config.model = "drill-model".into();
    config.timeout = timeout;
    ChatCompletionsSource::new(Some(config)).unwrap()
}

/// Reads one HTTP request: headers up to the blank line, then the body.
async fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0_u8; 1024];
    loop {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&buf).to_string();
        let Some(end) = text.find("\r\n\r\n") else {
            continue;
        };
        let length = text[..end]
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        if buf.len() >= end + 4 + length {
            break;
        }
    }
    String::from_utf8_lossy(&buf).to_string()
}

/// Answers a single request with `status` and `body`, handing back what it received.
async fn serve_once(status: &'static str, body: String) -> (SocketAddr, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let request = read_request(&mut stream).await;
        let response = format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.ok();
        let _ = tx.send(request);
    });
    (addr, rx)
}

#[tokio::test]
async fn completion_content_is_returned_trimmed() {
    let body = r#"{"choices":[{"message":{"role":"assistant","content":"  {\"word\": \"livre\", \"gender\": \"masculine\"}\n"}}]}"#;
    let (addr, request) = serve_once("200 OK", body.to_string()).await;
    let source = source_for(addr, Duration::from_secs(5));

    let text = source.generate("give me nouns").await.unwrap();
    assert_eq!(text, r#"{"word": "livre", "gender": "masculine"}"#);

    let request = request.await.unwrap();
    let lower = request.to_ascii_lowercase();
    assert!(request.starts_with("POST /v1/chat/completions "));
    assert!(lower.contains("authorization: bearer test-key"));
    assert!(request.contains(r#""model":"drill-model""#));
    assert!(request.contains("give me nouns"));
}

#[tokio::test]
async fn missing_content_is_an_empty_response() {
    let body = r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#;
    let (addr, _request) = serve_once("200 OK", body.to_string()).await;
    let source = source_for(addr, Duration::from_secs(5));

    let err = source.generate("give me nouns").await.unwrap_err();
    assert!(matches!(err, SupplyError::EmptyResponse));
}

#[tokio::test]
async fn server_errors_surface_their_status() {
    let (addr, _request) =
        serve_once("500 Internal Server Error", r#"{"error":"boom"}"#.to_string()).await;
    let source = source_for(addr, Duration::from_secs(5));

    let err = source.generate("give me nouns").await.unwrap_err();
    assert!(matches!(err, SupplyError::HttpStatus(StatusCode::INTERNAL_SERVER_ERROR)));
    assert!(err.is_unreachable());
}

#[tokio::test]
async fn stalled_server_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        read_request(&mut stream).await;
        tokio::time::sleep(Duration::from_secs(10)).await;
        drop(stream);
    });
    let source = source_for(addr, Duration::from_millis(300));

    let err = source.generate("give me nouns").await.unwrap_err();
    assert!(matches!(err, SupplyError::Timeout));
}

#[tokio::test]
async fn closed_port_is_unreachable() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let source = source_for(addr, Duration::from_secs(5));

    let err = source.generate("give me nouns").await.unwrap_err();
    assert!(matches!(err, SupplyError::Unreachable(_)));
}
