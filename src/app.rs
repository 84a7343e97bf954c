// app.rs
pub mod file_dialogs;
pub mod gui;
pub mod viewer;

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;

use eframe::egui;
use eframe::App as EframeApp;
use parking_lot::Mutex;

use crate::convert::{self, BatchReport, BatchUpdate, ConversionRequest, SizeBound};
use crate::utils::{timestamp, LogBuffer, Logger};
use viewer::ViewerHost;

pub struct App {
    /// Pending inputs in conversion order. This is the queue itself; the
    /// list widget only renders it, and the worker gets its own copy per
    /// batch.
    pub pending: Vec<PathBuf>,
    pub selected: HashSet<PathBuf>,
    pub resize_enabled: bool,
    pub max_width: String,
    pub max_height: String,
    pub quality: u8,
    pub running: bool,
    pub progress_done: usize,
    pub progress_total: usize,
    pub last_report: Option<BatchReport>,
    pub log_messages: LogBuffer,
    pub viewers: ViewerHost,
    batch_updates: Option<Receiver<BatchUpdate>>,
}

impl Default for App {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
            selected: HashSet::new(),
            resize_enabled: false,
            max_width: String::new(),
            max_height: String::new(),
            quality: 80,
            running: false,
            progress_done: 0,
            progress_total: 0,
            last_report: None,
            log_messages: Arc::new(Mutex::new(Vec::new())),
            viewers: ViewerHost::new(),
            batch_updates: None,
        }
    }
}

impl App {
    /// Files handed to the process from outside (command-line arguments,
    /// e.g. a file-manager "open with") go straight to the viewer.
    pub fn with_external_files(paths: Vec<PathBuf>) -> Self {
        let mut app = App::default();
        for path in paths {
            app.viewers.open_external(path);
        }
        app
    }

    pub fn log(&self, message: String) {
        self.log_messages
            .lock()
            .push(format!("[{}] {}", timestamp(), message));
    }

    pub fn add_file(&mut self, path: PathBuf) {
        if !self.pending.contains(&path) {
            self.log(format!("Added {}", path.display()));
            self.pending.push(path);
        }
    }

    pub fn remove_selected(&mut self) {
        self.pending.retain(|p| !self.selected.contains(p));
        self.selected.clear();
    }

    pub fn remove_all(&mut self) {
        self.pending.clear();
        self.selected.clear();
    }

    /// Snapshot the UI state into a request and hand it to a worker thread.
    /// `running` suppresses re-entry until the worker's `Finished` arrives.
    pub fn start_conversion(&mut self, ctx: &egui::Context) {
        if self.running {
            return;
        }
        let request = ConversionRequest {
            queue: self.pending.iter().cloned().collect(),
            quality: self.quality,
            bound: SizeBound::resolve(self.resize_enabled, &self.max_width, &self.max_height),
        };

        let (sender, receiver) = channel();
        self.batch_updates = Some(receiver);
        self.running = true;
        self.progress_done = 0;
        self.progress_total = request.queue.len();
        self.last_report = None;

        let log_messages = Arc::clone(&self.log_messages);
        let ctx = ctx.clone();
        std::thread::spawn(move || {
            let logger = Logger::new(log_messages);
            convert::run_batch(request, &sender, &logger);
            ctx.request_repaint();
        });
    }

    fn collect_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped: Vec<egui::DroppedFile> = ctx.input().raw.dropped_files.clone();
        for file in dropped {
            if let Some(path) = file.path {
                self.add_file(path);
            }
        }
    }

    fn drain_batch_updates(&mut self) -> bool {
        let receiver = match self.batch_updates.take() {
            Some(receiver) => receiver,
            None => return false,
        };

        let mut needs_redraw = false;
        let mut finished = false;
        while let Ok(update) = receiver.try_recv() {
            needs_redraw = true;
            match update {
                BatchUpdate::Started { total } => {
                    self.progress_total = total;
                    self.progress_done = 0;
                }
                BatchUpdate::Converted { path, .. } | BatchUpdate::Failed { path, .. } => {
                    self.progress_done += 1;
                    self.pending.retain(|p| p != &path);
                    self.selected.remove(&path);
                }
                BatchUpdate::Finished(report) => {
                    self.pending.clear();
                    self.selected.clear();
                    self.last_report = Some(report);
                    finished = true;
                }
            }
        }

        if finished {
            self.running = false;
        } else {
            self.batch_updates = Some(receiver);
        }
        needs_redraw
    }
}

impl EframeApp for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.collect_dropped_files(ctx);
        let needs_redraw = self.drain_batch_updates();

        gui::render(self, ctx);
        self.viewers.show(ctx);

        if needs_redraw {
            ctx.request_repaint();
        }
    }
}
