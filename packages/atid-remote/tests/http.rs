//! Round trips against a loopback HTTP server.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use ntest::timeout;

use atid_core::SkyCoord;
use atid_remote::transport::MAX_REDIRECTS;
use atid_remote::{RemoteCatalog, RemoteConfig, RemoteError};

const REPLY: &str = "Alpha Cen;14 39 36.49;-60 50 02.3;-3678.19;481.84;754.81;-18.6\n\
                     Proxima;14 29 42.95;-62 40 46.1;~;~;768.13;~\n\
                     \n";

fn read_request_head(stream: &mut TcpStream) -> String {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut buf).unwrap();
        if n == 0 {
            break;
        }
        head.extend_from_slice(&buf[..n]);
    }
    String::from_utf8_lossy(&head).into_owned()
}

/// Serves one request with `status` and `body`, reporting the request line.
fn serve_once(status: &'static str, body: &'static str) -> (SocketAddr, mpsc::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let head = read_request_head(&mut stream);
        let request_line = head.lines().next().unwrap_or_default().to_string();
        tx.send(request_line).unwrap();
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).unwrap();
    });
    (addr, rx)
}

/// Answers the first request with a relative `302` pointing at `/mirror` plus
/// the original query, then serves `body`, reporting both request lines.
fn serve_behind_redirect(body: &'static str) -> (SocketAddr, mpsc::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for hop in 0..2 {
            let (mut stream, _) = listener.accept().unwrap();
            let head = read_request_head(&mut stream);
            let request_line = head.lines().next().unwrap_or_default().to_string();
            let query = request_line
                .split_whitespace()
                .nth(1)
                .and_then(|target| target.split_once('?'))
                .map(|(_, query)| query.to_string())
                .unwrap_or_default();
            tx.send(request_line).unwrap();
            let response = if hop == 0 {
                format!(
                    "HTTP/1.1 302 Found\r\nLocation: /mirror/sim-script?{query}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                )
            } else {
                format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                )
            };
            stream.write_all(response.as_bytes()).unwrap();
        }
    });
    (addr, rx)
}

/// Redirects every request back to itself.
fn redirect_loop() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { break };
            let _ = read_request_head(&mut stream);
            let response = format!(
                "HTTP/1.1 301 Moved Permanently\r\nLocation: http://{addr}/again\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
            );
            let _ = stream.write_all(response.as_bytes());
        }
    });
    addr
}

/// Accepts one connection and never answers.
fn silent_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let _ = read_request_head(&mut stream);
            thread::sleep(Duration::from_secs(10));
        }
    });
    addr
}

fn catalog(addr: SocketAddr, timeout: Duration) -> RemoteCatalog {
    RemoteCatalog::new(RemoteConfig {
        endpoint: format!("http://{addr}/simbad/sim-script"),
        timeout,
    })
}

#[timeout(10000)]
#[test]
fn test_box_query_over_http() {
    let (addr, request) = serve_once("200 OK", REPLY);
    let catalog = catalog(addr, Duration::from_secs(5));

    let targets = catalog
        .query_box(SkyCoord::new(10.0, 20.0), SkyCoord::new(5.0, 15.0))
        .unwrap();
    assert_eq!(targets.len(), 2);
    assert_eq!(targets[0].name, "Alpha Cen");
    assert_eq!(targets[1].pm_ra, None);

    let request_line = request.recv().unwrap();
    assert!(request_line.starts_with("GET /simbad/sim-script?script=output%20console%3Doff"));
    assert!(request_line.contains("maintypes%3Dstar"));
    assert!(request_line.ends_with("HTTP/1.1"));
}

#[timeout(10000)]
#[test]
fn test_http_status_is_reported() {
    let (addr, _request) = serve_once("503 Service Unavailable", "busy");
    let catalog = catalog(addr, Duration::from_secs(5));
    assert_eq!(
        catalog.query_by_name("Vega"),
        Err(RemoteError::Status(503))
    );
}

#[timeout(10000)]
#[test]
fn test_timeout_bounds_the_call() {
    let addr = silent_server();
    let bound = Duration::from_millis(300);
    let catalog = catalog(addr, bound);

    let started = Instant::now();
    let result = catalog.query_cone(SkyCoord::new(219.9, -60.8), 1.0);
    let elapsed = started.elapsed();

    assert_eq!(result, Err(RemoteError::Timeout(bound)));
    assert!(elapsed >= bound);
    assert!(elapsed < Duration::from_secs(3), "call took {elapsed:?}");
}

#[timeout(10000)]
#[test]
fn test_refused_connection_is_http_error() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let catalog = catalog(addr, Duration::from_secs(5));
    assert!(matches!(
        catalog.query_by_name("Vega"),
        Err(RemoteError::Http(_))
    ));
}

#[timeout(10000)]
#[test]
fn test_redirect_is_followed() {
    let (addr, requests) = serve_behind_redirect(REPLY);
    let catalog = catalog(addr, Duration::from_secs(5));

    let target = catalog.query_by_name("Alpha Cen").unwrap().unwrap();
    assert_eq!(target.name, "Alpha Cen");

    let first = requests.recv().unwrap();
    let second = requests.recv().unwrap();
    assert!(first.starts_with("GET /simbad/sim-script?script="));
    assert!(second.starts_with("GET /mirror/sim-script?script="));
    assert_eq!(
        first.split_once('?').map(|(_, query)| query),
        second.split_once('?').map(|(_, query)| query)
    );
}

#[timeout(10000)]
#[test]
fn test_redirect_loop_is_cut_off() {
    let addr = redirect_loop();
    let catalog = catalog(addr, Duration::from_secs(5));
    match catalog.query_by_name("Vega") {
        Err(RemoteError::Http(message)) => {
            assert!(message.contains(&MAX_REDIRECTS.to_string()), "{message}")
        }
        other => panic!("unexpected result {other:?}"),
    }
}
