use log::{info, LevelFilter};
use memoize::{logger, memoize, MemoizeError};
use std::thread;
use std::time::{Duration, Instant};

#[memoize]
fn foo(i: i32, s0: String, f0: f64) -> (i32, String) {
    info!("running {}", s0);
    thread::sleep(Duration::from_secs_f64(f0));
    (i + 1, format!("{} {} {:.1}", i, s0, f0))
}

fn main() -> Result<(), MemoizeError> {
    logger::init(LevelFilter::Trace)?;

    for (i, s0, f0) in [(0, "delay", 3.2), (1, "nodelay", 0.0), (0, "delay", 3.2), (1, "nodelay", 0.0)] {
        let started = Instant::now();
        let (n, out) = foo(i, s0.to_string(), f0);
        info!("foo({}, {:?}, {}) = ({}, {:?}) in {:?}", i, s0, f0, n, out, started.elapsed());
    }
    Ok(())
}
