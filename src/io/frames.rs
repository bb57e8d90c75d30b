//! Camera frames of a recorded sequence.
//!
//! Dataset layout (one PNG per frame, 4-digit zero-padded index):
//!
//! ```text
//! <dataset>/<body>/frames/<sequence>0000.png   initialization frame
//! <dataset>/<body>/frames/<sequence>0001.png   first evaluated frame
//! ...
//! ```

use std::path::{Path, PathBuf};

use image::DynamicImage;

use crate::error::{Error, Result};

/// Width of the zero-padded frame index in file names.
pub const FRAME_INDEX_DIGITS: usize = 4;

/// A decoded camera frame handed to the tracker.
#[derive(Debug, Clone)]
pub struct Frame {
    pub index: usize,
    pub image: DynamicImage,
}

impl Frame {
    pub fn new(index: usize, image: DynamicImage) -> Self {
        Self { index, image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Source of frames addressed by sequential index; 0 is the initialization
/// frame.
pub trait FrameSource {
    fn load(&self, index: usize) -> Result<Frame>;
}

impl<F> FrameSource for F
where
    F: Fn(usize) -> Result<Frame>,
{
    fn load(&self, index: usize) -> Result<Frame> {
        self(index)
    }
}

/// Zero-pad a frame index: `1` -> `"0001"`. Indices wider than the pad width
/// are printed in full.
pub fn frame_file_name(index: usize) -> String {
    format!("{:0width$}", index, width = FRAME_INDEX_DIGITS)
}

/// Frames of one `(body, sequence)` pair read from a dataset directory.
#[derive(Debug, Clone)]
pub struct DatasetFrames {
    /// Common prefix of every frame path, e.g. `<dataset>/ape/frames/a_regular`.
    prefix: PathBuf,
}

impl DatasetFrames {
    pub fn new<P: AsRef<Path>>(dataset_dir: P, body: &str, sequence: &str) -> Self {
        let prefix = dataset_dir.as_ref().join(body).join("frames").join(sequence);
        Self { prefix }
    }

    pub fn frame_path(&self, index: usize) -> PathBuf {
        let mut name = self.prefix.as_os_str().to_owned();
        name.push(frame_file_name(index));
        name.push(".png");
        PathBuf::from(name)
    }
}

impl FrameSource for DatasetFrames {
    fn load(&self, index: usize) -> Result<Frame> {
        let path = self.frame_path(index);
        let image = image::open(&path).map_err(|e| Error::Frame {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        Ok(Frame::new(index, image))
    }
}
