// file_dialogs.rs
use rfd::FileDialog;
use std::path::PathBuf;

pub fn select_images() -> Option<Vec<PathBuf>> {
    FileDialog::new()
        .add_filter("Image", &["jpg", "jpeg", "png", "bmp", "gif", "tiff"])
        .pick_files()
}

pub fn select_viewer_image() -> Option<PathBuf> {
    FileDialog::new()
        .add_filter("Image", &["webp", "jpg", "jpeg", "png", "bmp", "gif", "tiff"])
        .pick_file()
}
