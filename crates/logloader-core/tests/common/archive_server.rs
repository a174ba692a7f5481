//! Minimal HTTP/1.1 log archive for integration tests.
//!
//! `GET /` answers the reachability probe. `POST /upload` records the request
//! body and answers with a redirect to the created log, like a review server.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ArchiveServerOptions {
    /// Status for `GET /`.
    pub probe_status: u16,
    /// Status for `POST /upload`.
    pub upload_status: u16,
    /// `Location` sent with the upload response; None omits the header.
    pub location: Option<String>,
    /// Read the upload and never answer it.
    pub stall_upload: bool,
}

impl Default for ArchiveServerOptions {
    fn default() -> Self {
        Self {
            probe_status: 200,
            upload_status: 302,
            location: Some("/plot_app?log=0001".to_string()),
            stall_upload: false,
        }
    }
}

pub struct ArchiveServer {
    /// Base URL, e.g. "http://127.0.0.1:12345/".
    pub url: String,
    uploads: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl ArchiveServer {
    /// Bodies of all `POST /upload` requests received so far.
    pub fn uploads(&self) -> Vec<Vec<u8>> {
        self.uploads.lock().unwrap().clone()
    }
}

pub fn start() -> ArchiveServer {
    start_with_options(ArchiveServerOptions::default())
}

/// Starts the server in a background thread. It runs until the process exits.
pub fn start_with_options(opts: ArchiveServerOptions) -> ArchiveServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let uploads = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&uploads);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let opts = opts.clone();
            let recorded = Arc::clone(&recorded);
            thread::spawn(move || handle(stream, &opts, &recorded));
        }
    });
    ArchiveServer {
        url: format!("http://127.0.0.1:{}/", port),
        uploads,
    }
}

fn handle(mut stream: TcpStream, opts: &ArchiveServerOptions, uploads: &Mutex<Vec<Vec<u8>>>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));

    let Some((head, mut body)) = read_head(&mut stream) else {
        return;
    };
    let (method, path, content_length) = parse_head(&head);
    while body.len() < content_length {
        let mut buf = [0u8; 8192];
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => break,
            Ok(n) => body.extend_from_slice(&buf[..n]),
        }
    }

    let response = match (method.as_str(), path.as_str()) {
        ("GET", "/") => status_line(opts.probe_status, None),
        ("POST", "/upload") => {
            uploads.lock().unwrap().push(body);
            if opts.stall_upload {
                // Hold the connection open without a byte of response.
                thread::sleep(Duration::from_secs(600));
                return;
            }
            status_line(opts.upload_status, opts.location.as_deref())
        }
        _ => status_line(404, None),
    };
    let _ = stream.write_all(response.as_bytes());
}

/// Read up to the end of the header block. Returns the header text and any body bytes already read.
fn read_head(stream: &mut TcpStream) -> Option<(String, Vec<u8>)> {
    let mut data = Vec::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = stream.read(&mut buf).ok()?;
        if n == 0 {
            return None;
        }
        data.extend_from_slice(&buf[..n]);
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&data[..pos]).into_owned();
            return Some((head, data[pos + 4..].to_vec()));
        }
    }
}

fn parse_head(head: &str) -> (String, String, usize) {
    let mut lines = head.lines();
    let mut request = lines.next().unwrap_or("").split_whitespace();
    let method = request.next().unwrap_or("").to_string();
    let path = request.next().unwrap_or("").to_string();
    let mut content_length = 0;
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }
    }
    (method, path, content_length)
}

fn status_line(status: u16, location: Option<&str>) -> String {
    let reason = match status {
        200 => "OK",
        302 => "Found",
        404 => "Not Found",
        _ => "Status",
    };
    let location = location
        .map(|l| format!("Location: {}\r\n", l))
        .unwrap_or_default();
    format!(
        "HTTP/1.1 {} {}\r\n{}Content-Length: 0\r\nConnection: close\r\n\r\n",
        status, reason, location
    )
}
