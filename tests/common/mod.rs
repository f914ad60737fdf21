#![allow(dead_code)]

pub use vcsrun_test_utils::*;

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use vcsrun::types::LineSink;

/// A sink that records every line it is given.
pub fn collecting_sink() -> (LineSink, Arc<Mutex<Vec<String>>>) {
    let lines = Arc::new(Mutex::new(Vec::new()));
    let captured = Arc::clone(&lines);
    let sink: LineSink = Arc::new(move |line: &str| {
        captured.lock().unwrap().push(line.to_string());
    });
    (sink, lines)
}

/// Poll until `path` holds a pid, for scripts that write `$$` on startup.
pub async fn wait_for_pid_file(path: &Path) -> u32 {
    for _ in 0..200 {
        if let Ok(contents) = std::fs::read_to_string(path) {
            if let Ok(pid) = contents.trim().parse() {
                return pid;
            }
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("pid file {:?} never appeared", path);
}
