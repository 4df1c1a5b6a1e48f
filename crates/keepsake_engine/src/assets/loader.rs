//! Sequential asset loading
//!
//! Assets are registered up front and loaded one per poll so the loading
//! screen keeps animating between them. A failed asset is logged and still
//! counts as ended; loading never stalls on a single bad file.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use super::AssetError;

/// What a source learned about one asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetInfo {
    /// Path as registered
    pub path: String,
    /// Pixel width (zero for non-image assets)
    pub width: u32,
    /// Pixel height (zero for non-image assets)
    pub height: u32,
}

/// Something that can fetch a single asset by path
pub trait AssetSource {
    /// Load (or at least validate) one asset
    fn load(&mut self, path: &str) -> Result<AssetInfo, AssetError>;
}

/// Reads image headers from disk relative to a root directory
#[derive(Debug, Clone)]
pub struct ImageFileSource {
    root: PathBuf,
}

impl ImageFileSource {
    /// Resolve registered paths against `root`
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }
}

impl AssetSource for ImageFileSource {
    fn load(&mut self, path: &str) -> Result<AssetInfo, AssetError> {
        let full_path = self.root.join(path);
        if !full_path.exists() {
            return Err(AssetError::NotFound(path.to_string()));
        }

        let (width, height) = image::image_dimensions(&full_path).map_err(|source| AssetError::Decode {
            path: path.to_string(),
            source,
        })?;
        log::debug!("Loaded image header {}x{} from {:?}", width, height, full_path);

        Ok(AssetInfo {
            path: path.to_string(),
            width,
            height,
        })
    }
}

/// Progress after one poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadProgress {
    /// Assets loaded or failed so far
    pub ended: usize,
    /// Assets registered
    pub total: usize,
}

impl LoadProgress {
    /// Whether every registered asset has ended
    pub fn is_finished(&self) -> bool {
        self.ended >= self.total
    }
}

/// Loads registered assets one per poll
pub struct LoadingManager {
    source: Box<dyn AssetSource>,
    queue: VecDeque<String>,
    loaded: Vec<AssetInfo>,
    failed: Vec<String>,
    total: usize,
}

impl std::fmt::Debug for LoadingManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadingManager")
            .field("queued", &self.queue.len())
            .field("loaded", &self.loaded.len())
            .field("failed", &self.failed)
            .field("total", &self.total)
            .finish_non_exhaustive()
    }
}

impl LoadingManager {
    /// Create an empty manager reading through `source`
    pub fn new(source: Box<dyn AssetSource>) -> Self {
        Self {
            source,
            queue: VecDeque::new(),
            loaded: Vec::new(),
            failed: Vec::new(),
            total: 0,
        }
    }

    /// Queue one asset
    pub fn register(&mut self, path: impl Into<String>) {
        self.queue.push_back(path.into());
        self.total += 1;
    }

    /// Queue several assets in order
    pub fn register_all<I, S>(&mut self, paths: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for path in paths {
            self.register(path);
        }
    }

    /// Load the next queued asset; `None` once the queue is empty
    pub fn poll(&mut self) -> Option<LoadProgress> {
        let path = self.queue.pop_front()?;
        match self.source.load(&path) {
            Ok(info) => self.loaded.push(info),
            Err(e) => {
                log::error!("Failed to load asset {}: {}", path, e);
                self.failed.push(path);
            }
        }
        Some(self.progress())
    }

    /// Current progress
    pub fn progress(&self) -> LoadProgress {
        LoadProgress {
            ended: self.loaded.len() + self.failed.len(),
            total: self.total,
        }
    }

    /// Successfully loaded assets
    pub fn loaded(&self) -> &[AssetInfo] {
        &self.loaded
    }

    /// Paths that failed to load
    pub fn failed(&self) -> &[String] {
        &self.failed
    }
}
