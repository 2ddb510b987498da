use portprobe::{scan_range, ScanError, ScanRequest};
use std::collections::HashSet;
use std::time::Duration;
use tokio::net::TcpListener;

async fn bind_in_range(start: u16, end: u16) -> TcpListener {
    for port in start..=end {
        if let Ok(listener) = TcpListener::bind(("127.0.0.1", port)).await {
            return listener;
        }
    }
    panic!("no free port in {start}-{end}");
}

#[tokio::test]
async fn finds_the_single_listener_in_range() {
    let listener = bind_in_range(20000, 20100).await;
    let port = listener.local_addr().unwrap().port();
    let server = tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            drop(stream);
        }
    });

    let req = ScanRequest::new("127.0.0.1", 20000, 20100, Duration::from_millis(300), 10).unwrap();
    let outcome = scan_range(&req).await.unwrap();

    assert_eq!(outcome.open_ports, vec![port]);
    assert_eq!(outcome.scanned_total, 101);
    assert_eq!(outcome.scanned_done, 101);
    assert!(!outcome.cancelled);

    server.abort();
}

#[tokio::test]
async fn well_known_range_is_sorted_unique_and_bounded() {
    let req = ScanRequest::new("127.0.0.1", 1, 1024, Duration::from_millis(200), 200).unwrap();
    let outcome = scan_range(&req).await.unwrap();

    let ports = &outcome.open_ports;
    assert!(ports.windows(2).all(|w| w[0] < w[1]));
    assert!(ports.iter().all(|p| (1..=1024).contains(p)));
}

#[tokio::test]
async fn repeated_scans_find_the_same_ports() {
    let a = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let b = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let expected: HashSet<u16> = [a.local_addr().unwrap().port(), b.local_addr().unwrap().port()]
        .into_iter()
        .collect();

    for port in &expected {
        let req = ScanRequest::new("127.0.0.1", *port, *port, Duration::from_millis(300), 1).unwrap();
        let first = scan_range(&req).await.unwrap();
        let second = scan_range(&req).await.unwrap();
        assert_eq!(first.open_ports, vec![*port]);
        assert_eq!(first.open_ports, second.open_ports);
    }
}

#[tokio::test]
async fn unresolvable_host_fails_the_scan() {
    let req = ScanRequest::new(
        "hostinexistant12345.invalid",
        1,
        100,
        Duration::from_millis(200),
        10,
    )
    .unwrap();
    let err = scan_range(&req).await.unwrap_err();
    assert_eq!(
        err,
        ScanError::Resolution {
            host: "hostinexistant12345.invalid".into()
        }
    );
}
