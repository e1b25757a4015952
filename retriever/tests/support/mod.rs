//! Test support utilities for end-to-end lookups.
//!
//! Provides a minimal HTTP/1.1 stub server bound to a loopback port. Each
//! route answers `GET` with a fixed status and body; unknown paths get a
//! 404. The server counts requests so tests can prove that skipped
//! dependencies never reach the network.

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread::JoinHandle;

/// A canned response for one request path.
#[derive(Clone, Debug)]
pub struct Route {
    path: String,
    status: u16,
    body: Vec<u8>,
}

impl Route {
    /// Answer `path` with 200 and `body`.
    pub fn ok(path: &str, body: Vec<u8>) -> Self {
        Self {
            path: path.to_owned(),
            status: 200,
            body,
        }
    }

    /// Answer `path` with `status` and an empty body.
    pub fn status(path: &str, status: u16) -> Self {
        Self {
            path: path.to_owned(),
            status,
            body: Vec::new(),
        }
    }
}

/// A loopback HTTP server serving fixed routes until dropped.
pub struct StubServer {
    addr: SocketAddr,
    hits: Arc<AtomicUsize>,
    shutdown: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl StubServer {
    /// Bind an ephemeral port and start serving `routes`.
    pub fn start(routes: Vec<Route>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub server");
        let addr = listener.local_addr().expect("stub server address");
        let routes: HashMap<String, Route> = routes
            .into_iter()
            .map(|route| (route.path.clone(), route))
            .collect();
        let hits = Arc::new(AtomicUsize::new(0));
        let shutdown = Arc::new(AtomicBool::new(false));

        let handle = {
            let hits = Arc::clone(&hits);
            let shutdown = Arc::clone(&shutdown);
            std::thread::spawn(move || {
                for stream in listener.incoming() {
                    if shutdown.load(Ordering::SeqCst) {
                        break;
                    }
                    let Ok(stream) = stream else { continue };
                    hits.fetch_add(1, Ordering::SeqCst);
                    serve(stream, &routes);
                }
            })
        };

        Self {
            addr,
            hits,
            shutdown,
            handle: Some(handle),
        }
    }

    /// Absolute URL of `path` on this server.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Number of requests received so far.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        // Wake the accept loop so it observes the flag.
        let _wake = TcpStream::connect(self.addr);
        if let Some(handle) = self.handle.take() {
            let _joined = handle.join();
        }
    }
}

fn serve(stream: TcpStream, routes: &HashMap<String, Route>) {
    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    if reader.read_line(&mut request_line).is_err() {
        return;
    }
    loop {
        let mut header = String::new();
        match reader.read_line(&mut header) {
            Ok(0) | Err(_) => break,
            Ok(_) if header == "\r\n" || header == "\n" => break,
            Ok(_) => {}
        }
    }

    let path = request_line.split_whitespace().nth(1).unwrap_or("/");
    let (status, body) = routes
        .get(path)
        .map_or((404, &[][..]), |route| (route.status, route.body.as_slice()));

    let mut stream = reader.into_inner();
    let head = format!(
        concat!(
            "HTTP/1.1 {} {}\r\n",
            "Content-Type: application/octet-stream\r\n",
            "Content-Length: {}\r\n",
            "Connection: close\r\n",
            "\r\n"
        ),
        status,
        reason(status),
        body.len()
    );
    let _written = stream
        .write_all(head.as_bytes())
        .and_then(|()| stream.write_all(body))
        .and_then(|()| stream.flush());
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Status",
    }
}

/// A loopback URL on which nothing is listening.
pub fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind throwaway listener");
    let addr = listener.local_addr().expect("throwaway listener address");
    drop(listener);
    format!("http://{addr}/source.tgz")
}
