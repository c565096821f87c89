//! Background loading of the manifest, drawer thumbnails and part images.
//!
//! Every request runs as a `rayon::spawn` job and reports exactly one
//! [`LoadResult`] over an mpsc channel. The UI thread drains the channel once
//! per frame with [`PartsLoader::poll`], so results are applied in completion
//! order, never in request order.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

use image::RgbaImage;

use crate::error::DollError;
use crate::manifest::Manifest;

#[derive(Debug)]
pub enum LoadResult {
    Manifest(Result<Manifest, DollError>),
    Thumbnail {
        source: String,
        image: Result<Arc<RgbaImage>, DollError>,
    },
    Part {
        source: String,
        image: Result<Arc<RgbaImage>, DollError>,
    },
}

pub struct PartsLoader {
    sender: Sender<LoadResult>,
    receiver: Receiver<LoadResult>,
    pending: usize,
}

impl Default for PartsLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl PartsLoader {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender,
            receiver,
            pending: 0,
        }
    }

    /// Number of jobs still running.
    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn request_manifest(&mut self, location: &str) {
        let location = location.to_string();
        self.spawn(move || {
            let result = crate::io::fetch_text(&location).and_then(|text| Manifest::from_json(&text));
            LoadResult::Manifest(result)
        });
    }

    pub fn request_thumbnail(&mut self, source: &str) {
        let source = source.to_string();
        self.spawn(move || {
            let image = crate::io::load_image_sync(&source).map(Arc::new);
            LoadResult::Thumbnail { source, image }
        });
    }

    /// Load the full image behind a clicked thumbnail.
    pub fn request_part(&mut self, source: &str) {
        let source = source.to_string();
        self.spawn(move || {
            let image = crate::io::load_image_sync(&source).map(Arc::new);
            LoadResult::Part { source, image }
        });
    }

    fn spawn<F>(&mut self, job: F)
    where
        F: FnOnce() -> LoadResult + Send + 'static,
    {
        self.pending += 1;
        let sender = self.sender.clone();
        rayon::spawn(move || {
            // Receiver gone means the app is shutting down.
            let _ = sender.send(job());
        });
    }

    /// Drain every finished job without blocking.
    pub fn poll(&mut self) -> Vec<LoadResult> {
        let mut done = Vec::new();
        while let Ok(result) = self.receiver.try_recv() {
            self.pending = self.pending.saturating_sub(1);
            done.push(result);
        }
        done
    }

    /// Block until `count` results have arrived. Used by headless callers and tests.
    pub fn wait_for(&mut self, count: usize) -> Vec<LoadResult> {
        let mut done = Vec::with_capacity(count);
        while done.len() < count {
            match self.receiver.recv() {
                Ok(result) => {
                    self.pending = self.pending.saturating_sub(1);
                    done.push(result);
                }
                Err(_) => break,
            }
        }
        done
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::Composition;
    use image::Rgba;

    fn write_png(dir: &std::path::Path, rel: &str, w: u32, h: u32) {
        let path = dir.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        RgbaImage::from_pixel(w, h, Rgba([1, 2, 3, 255])).save(&path).unwrap();
    }

    #[test]
    fn manifest_job_reports_parse_result() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("parts.json");
        std::fs::write(&path, r#"{"Prop-path": "x/", "Hair": ["h.png"]}"#).unwrap();

        let mut loader = PartsLoader::new();
        loader.request_manifest(path.to_str().unwrap());
        assert_eq!(loader.pending(), 1);
        let results = loader.wait_for(1);
        assert_eq!(loader.pending(), 0);
        match &results[0] {
            LoadResult::Manifest(Ok(m)) => assert_eq!(m.files("Hair").unwrap(), ["h.png"]),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn missing_manifest_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut loader = PartsLoader::new();
        loader.request_manifest(dir.path().join("missing.json").to_str().unwrap());
        let results = loader.wait_for(1);
        assert!(matches!(results[0], LoadResult::Manifest(Err(DollError::Io(_)))));
    }

    #[test]
    fn each_loaded_part_is_added_centered() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "Hair/a.png", 20, 10);
        write_png(dir.path(), "Tops/b.png", 7, 9);
        let base = format!("{}/", dir.path().display());

        let mut loader = PartsLoader::new();
        loader.request_part(&format!("{}Hair/a.png", base));
        loader.request_part(&format!("{}Tops/b.png", base));
        loader.request_part(&format!("{}Tops/missing.png", base));

        let mut comp = Composition::new(100, 100);
        for result in loader.wait_for(3) {
            if let LoadResult::Part { source, image: Ok(img) } = result {
                comp.add_centered(img, source);
            }
        }
        assert_eq!(comp.len(), 2);
        for part in comp.parts() {
            assert_eq!(part.x, (100.0 - part.w) / 2.0);
            assert_eq!(part.y, (100.0 - part.h) / 2.0);
        }
    }
}
