use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::unbounded;
use image::RgbaImage;

use crate::BackdropError;

/// One entry of the background image set.
///
/// A frame whose image failed to load keeps its slot so indices stay stable;
/// renderers treat it as a blank, transparent frame.
#[derive(Debug, Clone)]
pub struct Frame {
    source: PathBuf,
    image: Option<Arc<RgbaImage>>,
}

impl Frame {
    pub fn loaded(source: PathBuf, image: RgbaImage) -> Self {
        Self {
            source,
            image: Some(Arc::new(image)),
        }
    }

    pub fn blank(source: PathBuf) -> Self {
        Self {
            source,
            image: None,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn image(&self) -> Option<&RgbaImage> {
        self.image.as_deref()
    }

    pub fn is_blank(&self) -> bool {
        self.image.is_none()
    }
}

/// Ordered, immutable set of background frames.
#[derive(Debug, Clone)]
pub struct ImageSet {
    frames: Arc<[Frame]>,
}

impl ImageSet {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self {
            frames: frames.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Frame> {
        self.frames.iter()
    }

    pub fn loaded_count(&self) -> usize {
        self.frames.iter().filter(|frame| !frame.is_blank()).count()
    }
}

/// Upper bound on decoder threads, however many images are listed.
const MAX_PRELOAD_WORKERS: usize = 8;

fn worker_count(jobs: usize) -> usize {
    let cores = thread::available_parallelism().map_or(1, |n| n.get());
    jobs.min(cores).min(MAX_PRELOAD_WORKERS)
}

/// Decodes every image in `paths` on a small pool of worker threads.
///
/// Resolves once each image has either loaded or failed. Failures are logged
/// and leave a blank frame in place; this function never returns an error.
pub fn preload<P: AsRef<Path>>(paths: &[P]) -> ImageSet {
    let (job_sender, jobs) = unbounded();
    for (index, path) in paths.iter().enumerate() {
        let _ = job_sender.send((index, path.as_ref().to_path_buf()));
    }
    drop(job_sender);

    let (sender, receiver) = unbounded();
    let workers = worker_count(paths.len());
    tracing::debug!(images = paths.len(), workers, "preloading background frames");

    thread::scope(|scope| {
        for _ in 0..workers {
            let jobs = jobs.clone();
            let sender = sender.clone();
            scope.spawn(move || {
                for (index, path) in jobs.iter() {
                    let result = decode(&path);
                    let _ = sender.send((index, path, result));
                }
            });
        }
    });
    drop(sender);

    let mut slots: Vec<Option<Frame>> = vec![None; paths.len()];
    for (index, path, result) in receiver.iter() {
        let frame = match result {
            Ok(image) => {
                tracing::debug!(
                    path = %path.display(),
                    width = image.width(),
                    height = image.height(),
                    "preloaded background frame"
                );
                Frame::loaded(path, image)
            }
            Err(err) => {
                tracing::warn!(error = %err, "background frame unavailable; using blank frame");
                Frame::blank(path)
            }
        };
        slots[index] = Some(frame);
    }

    let frames: Vec<Frame> = slots
        .into_iter()
        .zip(paths)
        .map(|(slot, path)| slot.unwrap_or_else(|| Frame::blank(path.as_ref().to_path_buf())))
        .collect();

    let set = ImageSet::new(frames);
    tracing::info!(
        frames = set.len(),
        loaded = set.loaded_count(),
        "background image set ready"
    );
    set
}

fn decode(path: &Path) -> Result<RgbaImage, BackdropError> {
    image::open(path)
        .map(|image| image.to_rgba8())
        .map_err(|source| BackdropError::Decode {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use tempfile::TempDir;

    fn write_png(dir: &Path, name: &str, color: [u8; 4]) -> PathBuf {
        let path = dir.join(name);
        RgbaImage::from_pixel(4, 2, Rgba(color))
            .save(&path)
            .expect("write png");
        path
    }

    #[test]
    fn keeps_order_and_tolerates_failures() {
        let dir = TempDir::new().unwrap();
        let first = write_png(dir.path(), "first.png", [255, 0, 0, 255]);
        let missing = dir.path().join("missing.png");
        let corrupt = dir.path().join("corrupt.png");
        std::fs::write(&corrupt, b"definitely not a png").unwrap();
        let last = write_png(dir.path(), "last.png", [0, 0, 255, 255]);

        let set = preload(&[&first, &missing, &corrupt, &last]);

        assert_eq!(set.len(), 4);
        assert_eq!(set.loaded_count(), 2);
        assert_eq!(set.get(0).unwrap().source(), first.as_path());
        assert!(set.get(1).unwrap().is_blank());
        assert!(set.get(2).unwrap().is_blank());
        let image = set.get(3).unwrap().image().expect("decoded");
        assert_eq!(image.dimensions(), (4, 2));
        assert_eq!(image.get_pixel(0, 0), &Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn worker_pool_is_bounded() {
        assert_eq!(worker_count(0), 0);
        assert_eq!(worker_count(1), 1);
        assert!(worker_count(500) <= MAX_PRELOAD_WORKERS);
        assert!(worker_count(500) >= 1);
    }

    #[test]
    fn more_images_than_workers_still_load_in_order() {
        let dir = TempDir::new().unwrap();
        let count = MAX_PRELOAD_WORKERS * 3 + 1;
        let paths: Vec<PathBuf> = (0..count)
            .map(|i| {
                if i % 5 == 4 {
                    dir.path().join(format!("missing-{i}.png"))
                } else {
                    write_png(dir.path(), &format!("frame-{i}.png"), [i as u8, 0, 0, 255])
                }
            })
            .collect();

        let set = preload(&paths);

        assert_eq!(set.len(), count);
        assert_eq!(set.loaded_count(), count - count / 5);
        for (i, frame) in set.iter().enumerate() {
            assert_eq!(frame.source(), paths[i].as_path());
            match frame.image() {
                Some(image) => assert_eq!(image.get_pixel(0, 0)[0], i as u8),
                None => assert_eq!(i % 5, 4),
            }
        }
    }

    #[test]
    fn empty_input_resolves_to_empty_set() {
        let paths: [&Path; 0] = [];
        let set = preload(&paths);
        assert!(set.is_empty());
    }
}
