//! # Descriptor Module
//!
//! [`FileDescriptor`] carries the facts the comparison cascade needs about a
//! single file. Resolution, EXIF signature and both digests are computed
//! lazily and at most once per descriptor per run; later cascade stages reuse
//! what earlier stages already paid for.

use crate::core::hasher::{self, PixelDigest};
use crate::core::metadata;
use crate::core::scanner::is_photo_path;
use crate::error::HashError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A source or occupant file with lazily-cached comparison evidence
#[derive(Debug, Clone)]
pub struct FileDescriptor {
    path: PathBuf,
    size: u64,
    is_image: bool,
    // Caches: outer Option = "computed yet?", inner value = the answer.
    resolution: Option<Option<(u32, u32)>>,
    exif_signature: Option<Option<String>>,
    pixel_digest: Option<PixelDigest>,
    file_digest: Option<blake3::Hash>,
}

impl FileDescriptor {
    /// Create a descriptor for a file of known size
    ///
    /// The image flag is derived from the extension allow-list.
    pub fn new(path: PathBuf, size: u64) -> Self {
        let is_image = is_photo_path(&path);
        Self {
            path,
            size,
            is_image,
            resolution: None,
            exif_signature: None,
            pixel_digest: None,
            file_digest: None,
        }
    }

    /// Create a descriptor by stating the file
    pub fn from_path(path: &Path) -> io::Result<Self> {
        let metadata = fs::metadata(path)?;
        Ok(Self::new(path.to_path_buf(), metadata.len()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn is_image(&self) -> bool {
        self.is_image
    }

    /// Pixel dimensions as (width, height), if they can be determined
    pub fn resolution(&mut self) -> Option<(u32, u32)> {
        if self.resolution.is_none() {
            self.resolution = Some(metadata::resolution(&self.path));
        }
        self.resolution.unwrap_or(None)
    }

    /// The EXIF signature, if the file carries a readable EXIF block
    pub fn exif_signature(&mut self) -> Option<&str> {
        if self.exif_signature.is_none() {
            self.exif_signature = Some(metadata::exif_signature(&self.path));
        }
        self.exif_signature.as_ref().and_then(|s| s.as_deref())
    }

    /// The normalized pixel digest
    ///
    /// Errors are not cached; an undecodable-but-recognized file stays an
    /// error on every attempt, which the caller treats as inconclusive.
    pub fn pixel_digest(&mut self) -> Result<PixelDigest, HashError> {
        if let Some(digest) = self.pixel_digest {
            return Ok(digest);
        }
        let digest = hasher::pixel_digest(&self.path)?;
        self.pixel_digest = Some(digest);
        Ok(digest)
    }

    /// The whole-file digest
    pub fn file_digest(&mut self) -> Result<blake3::Hash, HashError> {
        if let Some(digest) = self.file_digest {
            return Ok(digest);
        }
        let digest = hasher::file_digest(&self.path)?;
        self.file_digest = Some(digest);
        Ok(digest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use tempfile::TempDir;

    #[test]
    fn classifies_by_extension() {
        let img = FileDescriptor::new(PathBuf::from("/a/photo.JPG"), 10);
        assert!(img.is_image());

        let other = FileDescriptor::new(PathBuf::from("/a/notes.txt"), 10);
        assert!(!other.is_image());
    }

    #[test]
    fn from_path_reads_size() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("f.png");
        std::fs::write(&path, b"12345").unwrap();

        let desc = FileDescriptor::from_path(&path).unwrap();
        assert_eq!(desc.size(), 5);
        assert!(desc.is_image());
    }

    #[test]
    fn caches_survive_file_deletion() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("img.png");
        let img = RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 255]));
        img.save(&path).unwrap();

        let mut desc = FileDescriptor::from_path(&path).unwrap();
        let first = desc.pixel_digest().unwrap();
        let res = desc.resolution();

        // Cached values are reused, not recomputed from disk
        std::fs::remove_file(&path).unwrap();
        assert_eq!(desc.pixel_digest().unwrap(), first);
        assert_eq!(desc.resolution(), res);
    }

    #[test]
    fn missing_exif_signature_is_cached_as_absent() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("img.png");
        let img = RgbaImage::from_pixel(2, 2, Rgba([9, 9, 9, 255]));
        img.save(&path).unwrap();

        let mut desc = FileDescriptor::from_path(&path).unwrap();
        assert!(desc.exif_signature().is_none());
        assert!(desc.exif_signature().is_none());
    }
}
