// utils.rs
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Shared buffer behind the GUI log panel.
pub type LogBuffer = Arc<Mutex<Vec<String>>>;

pub fn timestamp() -> String {
    chrono::Local::now().format("%H:%M:%S%.3f").to_string()
}

/// Forwards timestamped messages to the shared log buffer through a
/// collector thread, so the worker never blocks on the buffer lock while
/// the GUI is reading it.
pub struct Logger {
    sender: mpsc::Sender<String>,
}

impl Logger {
    pub fn new(buffer: LogBuffer) -> Self {
        let (sender, receiver) = mpsc::channel();

        thread::spawn(move || {
            for message in receiver {
                buffer.lock().push(message);
            }
        });

        Logger { sender }
    }

    pub fn log(&self, message: String) {
        self.sender
            .send(format!("[{}] {}", timestamp(), message))
            .unwrap_or_default();
    }
}

pub fn measure_time<F, T>(f: F) -> (T, Duration)
where
    F: FnOnce() -> T,
{
    let start = Instant::now();
    let result = f();
    (result, start.elapsed())
}

pub fn memory_usage() -> String {
    match sys_info::mem_info() {
        Ok(mem) => format!(
            "Memory: {} MB used of {} MB",
            (mem.total - mem.free) / 1024,
            mem.total / 1024
        ),
        Err(_) => "Memory info unavailable".to_string(),
    }
}
