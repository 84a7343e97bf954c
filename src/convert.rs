// convert.rs
use std::collections::VecDeque;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;

use image::io::Reader as ImageReader;
use image::{imageops::FilterType, DynamicImage, ImageError};

use crate::utils::{measure_time, memory_usage, Logger};

/// Maximum output size selected by the user. Aspect ratio is always
/// preserved and images are never scaled up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SizeBound {
    pub max_width: u32,
    pub max_height: u32,
}

impl SizeBound {
    /// Resolve the resize fields into an effective bound.
    ///
    /// Both fields empty or unparseable means no resizing. A single valid
    /// field is used for both axes, so width "100" with an empty height
    /// bounds the output to 100x100.
    pub fn resolve(resize_enabled: bool, max_width: &str, max_height: &str) -> Option<SizeBound> {
        if !resize_enabled {
            return None;
        }
        match (parse_dimension(max_width), parse_dimension(max_height)) {
            (Some(w), Some(h)) => Some(SizeBound {
                max_width: w,
                max_height: h,
            }),
            (Some(v), None) | (None, Some(v)) => Some(SizeBound {
                max_width: v,
                max_height: v,
            }),
            (None, None) => None,
        }
    }

    fn exceeded_by(&self, img: &DynamicImage) -> bool {
        img.width() > self.max_width || img.height() > self.max_height
    }
}

fn parse_dimension(text: &str) -> Option<u32> {
    text.trim().parse::<u32>().ok().filter(|v| *v > 0)
}

/// One Convert action's worth of work. Built from the UI state when the
/// button is pressed and handed to the worker thread whole.
pub struct ConversionRequest {
    pub queue: VecDeque<PathBuf>,
    pub quality: u8,
    pub bound: Option<SizeBound>,
}

#[derive(Clone, Debug)]
pub struct BatchReport {
    pub converted: Vec<PathBuf>,
    pub failure: Option<BatchFailure>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

#[derive(Clone, Debug)]
pub struct BatchFailure {
    pub index: usize,
    pub path: PathBuf,
    pub message: String,
}

/// Worker-to-UI events. `Finished` is sent unconditionally, whatever
/// happened before it, and carries the full report.
pub enum BatchUpdate {
    Started { total: usize },
    Converted { path: PathBuf, output: PathBuf },
    Failed { path: PathBuf, message: String },
    Finished(BatchReport),
}

/// Converts the queued files one at a time, in order. Each path is popped
/// from the queue before it is processed, so a mid-batch failure leaves the
/// remaining items unconverted. The first item error aborts the rest of the
/// batch; outputs already written are kept.
pub fn run_batch(
    request: ConversionRequest,
    updates: &Sender<BatchUpdate>,
    logger: &Logger,
) -> BatchReport {
    let ConversionRequest {
        mut queue,
        quality,
        bound,
    } = request;

    let total = queue.len();
    logger.log(format!("Starting batch of {} file(s), quality {}", total, quality));
    logger.log(memory_usage());
    let _ = updates.send(BatchUpdate::Started { total });

    let mut report = BatchReport {
        converted: Vec::new(),
        failure: None,
    };

    let mut index = 0;
    while let Some(path) = queue.pop_front() {
        let (result, duration) = measure_time(|| convert_one(&path, quality, bound));
        match result {
            Ok(output) => {
                log_converted(logger, &path, &output, duration);
                report.converted.push(output.clone());
                let _ = updates.send(BatchUpdate::Converted { path, output });
            }
            Err(err) => {
                let message = err.to_string();
                logger.log(format!("Failed to convert {}: {}", path.display(), message));
                let _ = updates.send(BatchUpdate::Failed {
                    path: path.clone(),
                    message: message.clone(),
                });
                report.failure = Some(BatchFailure {
                    index,
                    path,
                    message,
                });
                break;
            }
        }
        index += 1;
    }

    if report.is_success() {
        logger.log(format!("Batch finished, {} file(s) converted", report.converted.len()));
    } else {
        logger.log(format!(
            "Batch aborted after {} of {} file(s)",
            report.converted.len(),
            total
        ));
    }
    let _ = updates.send(BatchUpdate::Finished(report.clone()));
    report
}

fn log_converted(logger: &Logger, path: &Path, output: &Path, duration: std::time::Duration) {
    let sizes = std::fs::metadata(path).ok().zip(std::fs::metadata(output).ok());
    match sizes {
        Some((original, compressed)) if original.len() > 0 => {
            let saved = 100.0 - (compressed.len() as f64 / original.len() as f64) * 100.0;
            logger.log(format!(
                "{} -> {} ({:.1}% smaller) in {:?}",
                path.display(),
                output.display(),
                saved,
                duration
            ));
        }
        _ => logger.log(format!(
            "{} -> {} in {:?}",
            path.display(),
            output.display(),
            duration
        )),
    }
}

fn convert_one(path: &Path, quality: u8, bound: Option<SizeBound>) -> Result<PathBuf, ImageError> {
    let img = ImageReader::open(path)?.decode()?;

    let img = match bound {
        // resize() keeps the aspect ratio; the exceeded_by guard keeps
        // smaller images at their native size.
        Some(bound) if bound.exceeded_by(&img) => {
            img.resize(bound.max_width, bound.max_height, FilterType::Lanczos3)
        }
        _ => img,
    };

    let data = encode_webp(&img, quality)?;
    let output = webp_sibling(path);
    save_webp(&data, &output)?;
    Ok(output)
}

fn encode_webp(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, ImageError> {
    let encoder = webp::Encoder::from_image(img).map_err(encoding_error)?;
    let mut config = webp::WebPConfig::new().map_err(|_| encoding_error("invalid WebP config"))?;
    config.quality = f32::from(quality);
    // method 6 is the slowest, best-compressing effort level
    config.method = 6;
    let encoded = encoder
        .encode_advanced(&config)
        .map_err(|e| encoding_error(format!("{:?}", e)))?;
    Ok(encoded.to_vec())
}

fn encoding_error(message: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> ImageError {
    ImageError::Encoding(image::error::EncodingError::new(
        image::error::ImageFormatHint::Exact(image::ImageFormat::WebP),
        message,
    ))
}

/// Output naming: the extension is appended, not substituted, so
/// `photo.jpg` becomes `photo.jpg.webp` next to the input.
pub fn webp_sibling(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".webp");
    PathBuf::from(name)
}

fn save_webp(data: &[u8], output: &Path) -> std::io::Result<()> {
    let mut file = File::create(output)?;
    file.write_all(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::mpsc::channel;
    use std::sync::Arc;

    fn workspace(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("webpow-{}-{}", tag, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([90, 120, 40, 255]));
        img.save(&path).unwrap();
        path
    }

    fn webp_dimensions(path: &Path) -> (u32, u32) {
        let bytes = std::fs::read(path).unwrap();
        let decoded = webp::Decoder::new(&bytes).decode().unwrap();
        (decoded.width(), decoded.height())
    }

    fn run(request: ConversionRequest) -> (BatchReport, Vec<BatchUpdate>) {
        let (sender, receiver) = channel();
        let logger = Logger::new(Arc::new(Mutex::new(Vec::new())));
        let report = run_batch(request, &sender, &logger);
        drop(sender);
        (report, receiver.try_iter().collect())
    }

    #[test]
    fn converts_at_native_size_without_bound() {
        let dir = workspace("native");
        for quality in [0u8, 80, 100] {
            let input = write_png(&dir, &format!("plain-{}.png", quality), 64, 48);
            let (report, _) = run(ConversionRequest {
                queue: VecDeque::from([input.clone()]),
                quality,
                bound: None,
            });
            assert!(report.is_success());
            assert_eq!(report.converted, vec![webp_sibling(&input)]);
            assert_eq!(webp_dimensions(&report.converted[0]), (64, 48));
        }
    }

    #[test]
    fn bound_shrinks_preserving_aspect() {
        let dir = workspace("shrink");
        let input = write_png(&dir, "wide.png", 160, 90);
        let (report, _) = run(ConversionRequest {
            queue: VecDeque::from([input]),
            quality: 80,
            bound: Some(SizeBound {
                max_width: 80,
                max_height: 60,
            }),
        });
        // Width is the limiting dimension; 90 * 80/160 = 45.
        assert_eq!(webp_dimensions(&report.converted[0]), (80, 45));
    }

    #[test]
    fn bound_never_upscales() {
        let dir = workspace("upscale");
        let input = write_png(&dir, "small.png", 40, 30);
        let (report, _) = run(ConversionRequest {
            queue: VecDeque::from([input]),
            quality: 80,
            bound: Some(SizeBound {
                max_width: 100,
                max_height: 100,
            }),
        });
        assert_eq!(webp_dimensions(&report.converted[0]), (40, 30));
    }

    #[test]
    fn single_field_becomes_square_bound() {
        // Observed behavior of the original UI, kept as-is: one valid field
        // fills in for the missing one.
        let square = Some(SizeBound {
            max_width: 100,
            max_height: 100,
        });
        assert_eq!(SizeBound::resolve(true, "100", ""), square);
        assert_eq!(SizeBound::resolve(true, "", "100"), square);
        assert_eq!(SizeBound::resolve(true, "100", "abc"), square);
    }

    #[test]
    fn invalid_fields_mean_no_resize() {
        assert_eq!(SizeBound::resolve(false, "100", "100"), None);
        assert_eq!(SizeBound::resolve(true, "", ""), None);
        assert_eq!(SizeBound::resolve(true, "abc", "-3"), None);
        assert_eq!(SizeBound::resolve(true, "0", ""), None);
        assert_eq!(
            SizeBound::resolve(true, " 120 ", "90"),
            Some(SizeBound {
                max_width: 120,
                max_height: 90,
            })
        );
    }

    #[test]
    fn failure_aborts_the_rest_of_the_batch() {
        let dir = workspace("abort");
        let first = write_png(&dir, "ok-1.png", 32, 32);
        let broken = dir.join("broken.jpg");
        std::fs::write(&broken, b"this is not an image").unwrap();
        let third = write_png(&dir, "ok-2.png", 32, 32);

        let (report, updates) = run(ConversionRequest {
            queue: VecDeque::from([first.clone(), broken.clone(), third.clone()]),
            quality: 80,
            bound: None,
        });

        assert_eq!(report.converted, vec![webp_sibling(&first)]);
        assert!(webp_sibling(&first).exists());
        assert!(!webp_sibling(&broken).exists());
        assert!(!webp_sibling(&third).exists());

        let failure = report.failure.unwrap();
        assert_eq!(failure.index, 1);
        assert_eq!(failure.path, broken);
        assert!(!failure.message.is_empty());

        assert!(matches!(updates.first(), Some(BatchUpdate::Started { total: 3 })));
        assert!(matches!(updates.last(), Some(BatchUpdate::Finished(_))));
    }

    #[test]
    fn empty_batch_still_finishes_cleanly() {
        let (report, updates) = run(ConversionRequest {
            queue: VecDeque::new(),
            quality: 80,
            bound: None,
        });
        assert!(report.is_success());
        assert!(report.converted.is_empty());
        assert!(matches!(updates.first(), Some(BatchUpdate::Started { total: 0 })));
        assert!(matches!(updates.last(), Some(BatchUpdate::Finished(_))));
    }

    #[test]
    fn sibling_keeps_the_original_extension() {
        assert_eq!(
            webp_sibling(Path::new("/tmp/photo.jpg")),
            PathBuf::from("/tmp/photo.jpg.webp")
        );
        assert_eq!(
            webp_sibling(Path::new("no-extension")),
            PathBuf::from("no-extension.webp")
        );
    }
}
