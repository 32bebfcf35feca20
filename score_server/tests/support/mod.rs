use std::net::{SocketAddr, TcpStream};
use std::sync::OnceLock;
use std::thread;
use std::time::Duration;

static SERVER: OnceLock<SocketAddr> = OnceLock::new();

/// Starts one server for the whole test binary and returns its address.
///
/// The server lives on its own thread with its own runtime so it keeps
/// running while individual test runtimes start and stop around it.
pub fn ensure_server() -> SocketAddr {
    *SERVER.get_or_init(|| {
        // These tests exercise the seeded in-memory store. Drop DATABASE_URL
        // so a developer's local database never leaks into the run.
        unsafe {
            std::env::remove_var("DATABASE_URL");
        }

        // Bind port 0 first so parallel test binaries never race for a port,
        // then hand the listener to the server.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        listener.set_nonblocking(true).unwrap();

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().unwrap();
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::from_std(listener).unwrap();
                score_server::run(listener).await.unwrap();
            });
        });

        // Don't hand out the address until the socket accepts connections.
        for _ in 0..50 {
            if TcpStream::connect(addr).is_ok() {
                return addr;
            }
            thread::sleep(Duration::from_millis(100));
        }
        panic!("score server did not come up");
    })
}

pub fn base_url(addr: SocketAddr) -> String {
    format!("http://{addr}")
}

pub fn ws_url(addr: SocketAddr) -> String {
    format!("ws://{addr}/ws")
}
