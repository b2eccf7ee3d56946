//! Shared setup for the tests that talk to the in-process mock service.
//!
//! One server per test binary: the worker token is cached process-wide, so
//! every test in a binary has to see the same token store.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::OnceLock;

use booker_core::{Config, Fixture};

static SERVER: OnceLock<SocketAddr> = OnceLock::new();

/// Start the mock service on a random port the first time it is asked for.
pub fn server_addr() -> SocketAddr {
    *SERVER.get_or_init(|| {
        let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = std_listener.local_addr().unwrap();
        std_listener.set_nonblocking(true).unwrap();

        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(2)
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(async {
                let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
                mock_server::run(listener).await
            })
            .unwrap();
        });

        addr
    })
}

pub fn config() -> Config {
    Config::default().with_base_url(format!("http://{}", server_addr()))
}

pub fn fixture() -> Fixture {
    Fixture::new(&config()).unwrap()
}
