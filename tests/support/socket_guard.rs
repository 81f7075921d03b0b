//! Mock server startup that degrades to a skip in socket-restricted sandboxes.

use std::net::TcpListener;

use wiremock::MockServer;

/// Starts a wiremock server, or returns `None` when loopback sockets are unavailable.
pub async fn start_mock_server_or_skip() -> Option<MockServer> {
    if let Err(error) = TcpListener::bind("127.0.0.1:0") {
        eprintln!("skipping: cannot bind loopback socket ({error})");
        return None;
    }
    Some(MockServer::start().await)
}

/// Returns a loopback URL with nothing listening on it.
pub fn closed_port_url(path: &str) -> Option<String> {
    let listener = TcpListener::bind("127.0.0.1:0").ok()?;
    let port = listener.local_addr().ok()?.port();
    drop(listener);
    Some(format!("http://127.0.0.1:{port}{path}"))
}
