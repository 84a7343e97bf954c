// viewer.rs
use std::path::PathBuf;

use eframe::egui;
use image::io::Reader as ImageReader;

use crate::fit;

/// Owns the open viewer windows and decides which of them receives files
/// opened from outside the converter flow (command line, the File menu).
/// Routing lives here, on the app lifecycle, rather than in any
/// process-wide state.
pub struct ViewerHost {
    windows: Vec<ViewerWindow>,
    active: Option<u64>,
    next_id: u64,
}

impl ViewerHost {
    pub fn new() -> Self {
        Self {
            windows: Vec::new(),
            active: None,
            next_id: 0,
        }
    }

    /// Show an externally opened file in the active viewer, or spawn a
    /// window when none is open.
    pub fn open_external(&mut self, path: PathBuf) {
        let target = self
            .active
            .and_then(|id| self.windows.iter().position(|w| w.id == id));
        match target {
            Some(i) => self.windows[i].set_image(path),
            None => self.spawn(path),
        }
    }

    pub fn spawn(&mut self, path: PathBuf) {
        let id = self.next_id;
        self.next_id += 1;
        self.windows.push(ViewerWindow::new(id, path));
        self.active = Some(id);
    }

    pub fn show(&mut self, ctx: &egui::Context) {
        for window in &mut self.windows {
            if window.show(ctx) {
                self.active = Some(window.id);
            }
        }

        if self.windows.iter().any(|w| !w.open) {
            self.windows.retain(|w| w.open);
            let still_active = self
                .active
                .map_or(false, |id| self.windows.iter().any(|w| w.id == id));
            if !still_active {
                self.active = self.windows.last().map(|w| w.id);
            }
        }
    }
}

/// One floating window per opened picture. The decoded image is uploaded
/// as a texture on first draw and displayed at the largest size that fits
/// the window while keeping its aspect ratio.
pub struct ViewerWindow {
    id: u64,
    open: bool,
    path: PathBuf,
    decoded: Option<egui::ColorImage>,
    texture: Option<egui::TextureHandle>,
    error: Option<String>,
}

impl ViewerWindow {
    fn new(id: u64, path: PathBuf) -> Self {
        let mut window = Self {
            id,
            open: true,
            path,
            decoded: None,
            texture: None,
            error: None,
        };
        window.load();
        window
    }

    pub fn set_image(&mut self, path: PathBuf) {
        self.path = path;
        self.decoded = None;
        self.texture = None;
        self.error = None;
        self.load();
    }

    fn load(&mut self) {
        let result = ImageReader::open(&self.path)
            .map_err(|e| e.to_string())
            .and_then(|reader| reader.decode().map_err(|e| e.to_string()));
        match result {
            Ok(img) => {
                let rgba = img.to_rgba8();
                let size = [rgba.width() as usize, rgba.height() as usize];
                self.decoded = Some(egui::ColorImage::from_rgba_unmultiplied(
                    size,
                    rgba.as_raw(),
                ));
            }
            Err(message) => {
                self.error = Some(format!("Could not open {}: {}", self.path.display(), message));
            }
        }
    }

    /// Returns true when the user interacted with the window, which makes
    /// it the active target for externally opened files.
    fn show(&mut self, ctx: &egui::Context) -> bool {
        let title = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.to_string_lossy().into_owned());

        let mut open = self.open;
        let response = egui::Window::new(title)
            .id(egui::Id::new(("viewer", self.id)))
            .open(&mut open)
            .default_size(egui::vec2(480.0, 360.0))
            .resizable(true)
            .show(ctx, |ui| {
                if let Some(decoded) = self.decoded.take() {
                    self.texture = Some(ui.ctx().load_texture(
                        format!("viewer-{}", self.id),
                        decoded,
                        egui::TextureFilter::Linear,
                    ));
                }

                if let Some(error) = &self.error {
                    ui.colored_label(egui::Color32::RED, error);
                    return;
                }

                let texture = match &self.texture {
                    Some(texture) => texture,
                    None => {
                        ui.label("No image loaded");
                        return;
                    }
                };

                // Recomputed every frame so resizing the window re-fits
                // the picture.
                let tex_size = texture.size_vec2();
                let avail = ui.available_size();
                match fit::fit(tex_size.x, tex_size.y, avail.x, avail.y) {
                    Some((w, h)) => {
                        ui.centered_and_justified(|ui| {
                            ui.image(texture.id(), egui::vec2(w, h));
                        });
                    }
                    None => {
                        ui.label("No image loaded");
                    }
                }
            });
        self.open = open;

        match response {
            Some(inner) => inner.response.clicked() || inner.response.drag_started(),
            None => false,
        }
    }
}
