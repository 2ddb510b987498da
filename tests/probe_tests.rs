use portprobe::{probe, PortState, ProbeError};
use std::time::{Duration, Instant};
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tokio::task::JoinHandle;

fn serve(listener: TcpListener) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            drop(stream);
        }
    })
}

async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

#[tokio::test]
async fn listening_port_is_open() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let server = serve(listener);

    let state = probe("127.0.0.1", port, Duration::from_millis(500)).await;
    assert_eq!(state, Ok(PortState::Open), "port {port} should be open");

    server.abort();
}

#[tokio::test]
async fn unused_port_is_closed() {
    let port = closed_port().await;
    let state = probe("127.0.0.1", port, Duration::from_millis(500)).await;
    assert_eq!(state, Ok(PortState::Closed));
}

#[tokio::test]
async fn unresolvable_host_names_the_host() {
    let host = "hostinexistant12345.invalid";
    let err = probe(host, 80, Duration::from_millis(500))
        .await
        .unwrap_err();
    assert!(matches!(err, ProbeError::ResolutionFailure { .. }));
    assert!(err.to_string().contains(host));
}

#[tokio::test]
async fn refused_port_returns_quickly() {
    let port = closed_port().await;
    let started = Instant::now();
    let _ = probe("127.0.0.1", port, Duration::from_millis(100)).await;
    let elapsed = started.elapsed();
    assert!(elapsed < Duration::from_millis(500), "took {elapsed:?}");
}

#[tokio::test]
async fn unresponsive_port_times_out_as_closed() {
    // Backlog of one, already taken: further SYNs go unanswered.
    let socket = TcpSocket::new_v4().unwrap();
    socket.bind("127.0.0.1:0".parse().unwrap()).unwrap();
    let listener = socket.listen(0).unwrap();
    let addr = listener.local_addr().unwrap();
    let _held = TcpStream::connect(addr).await.unwrap();

    let started = Instant::now();
    let state = probe("127.0.0.1", addr.port(), Duration::from_millis(100)).await;
    let elapsed = started.elapsed();

    assert_eq!(state, Ok(PortState::Closed));
    assert!(elapsed >= Duration::from_millis(90), "took {elapsed:?}");
    assert!(elapsed < Duration::from_millis(500), "took {elapsed:?}");
}
