//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves a single static body and can inject failures: a fixed status code,
//! dropped connections for the first N requests, and a per-request delay.
//! Tracks how many requests were seen and how many were in flight at once so
//! tests can assert the worker-pool bound.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct ServerOptions {
    /// Status code sent on every response.
    pub status: u32,
    /// Drop the connection (no response at all) for the first N requests.
    pub fail_first: u32,
    /// Sleep this long while "handling" each request, to widen the window
    /// in which concurrent requests overlap.
    pub delay: Duration,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            status: 200,
            fail_first: 0,
            delay: Duration::ZERO,
        }
    }
}

/// Counters shared with the test: total requests seen, and the high-water
/// mark of concurrently handled requests.
#[derive(Debug, Default)]
pub struct ServerStats {
    requests: AtomicU32,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ServerStats {
    pub fn requests(&self) -> u32 {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

/// Starts a server in a background thread serving `body`. Returns the base
/// URL (e.g. "http://127.0.0.1:12345/"). The server runs until the process
/// exits.
pub fn start(body: Vec<u8>) -> String {
    let (url, _stats) = start_with_options(body, ServerOptions::default());
    url
}

/// Like `start` but with failure injection and shared stats.
pub fn start_with_options(body: Vec<u8>, opts: ServerOptions) -> (String, Arc<ServerStats>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let body = Arc::new(body);
    let stats = Arc::new(ServerStats::default());
    let stats_srv = Arc::clone(&stats);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let body = Arc::clone(&body);
            let stats = Arc::clone(&stats_srv);
            thread::spawn(move || handle(stream, &body, opts, &stats));
        }
    });
    (format!("http://127.0.0.1:{}/", port), stats)
}

fn handle(
    mut stream: std::net::TcpStream,
    body: &[u8],
    opts: ServerOptions,
    stats: &ServerStats,
) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));

    // Read (and discard) the request before deciding how to respond, so the
    // client never sees a reset while still sending.
    let mut buf = [0u8; 8192];
    match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(_) => {}
    }

    let seq = stats.requests.fetch_add(1, Ordering::SeqCst);
    if seq < opts.fail_first {
        // Close without responding: the client sees an empty reply.
        return;
    }

    let now = stats.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
    stats.max_in_flight.fetch_max(now, Ordering::SeqCst);

    if !opts.delay.is_zero() {
        thread::sleep(opts.delay);
    }

    let reason = match opts.status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Status",
    };
    let header = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        opts.status,
        reason,
        body.len()
    );
    let _ = stream.write_all(header.as_bytes());
    let _ = stream.write_all(body);
    let _ = stream.flush();

    stats.in_flight.fetch_sub(1, Ordering::SeqCst);
}
