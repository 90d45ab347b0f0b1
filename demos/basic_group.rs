//! A single-process cache group backed by an in-memory "source of truth".
//!
//! Run with: `cargo run --bin basic_group`

use shardcache::error::BoxError;
use shardcache::group::new_group;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

fn main() {
    tracing_subscriber::fmt::init();

    let source: Arc<Mutex<HashMap<String, String>>> = Arc::new(Mutex::new(HashMap::from([
        ("Tom".to_string(), "630".to_string()),
        ("Jack".to_string(), "589".to_string()),
        ("Sam".to_string(), "567".to_string()),
    ])));

    let source_for_loader = source.clone();
    let scores = new_group(
        "scores",
        1 << 20,
        Arc::new(move |key: &str| -> Result<Vec<u8>, BoxError> {
            println!("[source-of-truth] searching for {key}");
            source_for_loader
                .lock()
                .unwrap()
                .get(key)
                .map(|v| v.clone().into_bytes())
                .ok_or_else(|| format!("{key} not found").into())
        }),
    );

    for name in ["Tom", "Jack", "Tom", "unknown"] {
        match scores.get(name) {
            Ok(view) => println!("{name} => {}", view.to_string_lossy()),
            Err(err) => println!("{name} => error: {err}"),
        }
    }
}
