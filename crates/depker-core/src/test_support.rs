//! Raw HTTP fixtures that mockito cannot express.

use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::thread;
use std::time::Duration;

/// Longer than any client-side deadline a default HTTP client would apply.
pub(crate) const STALL: Duration = Duration::from_secs(31);

/// Serve a single request: send `head`, go quiet for `stall`, then send
/// `tail` and close. Returns the base URL.
pub(crate) fn stalled_server(head: &'static str, stall: Duration, tail: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut line = String::new();
        while reader.read_line(&mut line).unwrap() > 0 && line != "\r\n" {
            line.clear();
        }
        stream.write_all(head.as_bytes()).unwrap();
        stream.flush().unwrap();
        thread::sleep(stall);
        stream.write_all(tail.as_bytes()).unwrap();
    });
    format!("http://{addr}")
}
