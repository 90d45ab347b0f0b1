//! A single node serving the default HTTP peer transport, demonstrating how
//! an embedder wires `shardcache::transport` into an `axum` server and
//! configures a peer pool. Run with: `cargo run --bin peer_cluster --features http`

use axum::Router;
use shardcache::error::BoxError;
use shardcache::group::new_group;
use shardcache::transport::{self, HttpPool, HttpPoolConfig};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let self_addr = "http://127.0.0.1:8001".to_string();

    new_group(
        "scores",
        1 << 20,
        Arc::new(|key: &str| -> Result<Vec<u8>, BoxError> {
            Ok(format!("computed-value-for-{key}").into_bytes())
        }),
    );

    let config = HttpPoolConfig::new(self_addr.clone());
    let base_path = config.base_path.clone();

    // In a real cluster each process would list every peer's address,
    // including its own, so the ring agrees on ownership across the fleet.
    let pool = Arc::new(HttpPool::new(config));
    pool.set_peers([self_addr.clone(), "http://127.0.0.1:8002".to_string()]);

    let group = shardcache::get_group("scores").unwrap();
    group.register_peers(pool);

    // HttpGetter dials peers at `{base_path}{group}/{key}`, so the router
    // must be mounted under that same prefix for peer requests to land.
    let app = Router::new().nest(base_path.trim_end_matches('/'), transport::router());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:8001").await.unwrap();
    println!("serving group \"scores\" on {self_addr}{base_path}");
    axum::serve(listener, app).await.unwrap();
}
