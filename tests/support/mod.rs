#![allow(dead_code)]

pub mod annotation;
pub mod channels;

use std::time::{Duration, Instant};

/// Poll `done` until it returns true or the deadline passes.
pub fn wait_until(deadline: Duration, mut done: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < deadline {
        if done() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    done()
}
