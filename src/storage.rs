use crate::{Image, PixelBuffer, RenderError, Result};
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

/// Suggested location of a rendered image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    pub directory: PathBuf,
    /// File name without extension
    pub file_stem: String,
}

impl OutputTarget {
    pub fn new(directory: impl Into<PathBuf>, file_stem: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            file_stem: file_stem.into(),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.directory.join(format!("{}.png", self.file_stem))
    }
}

/// Persists finished renders
pub trait Storage {
    /// Write image and return path it was written to
    fn save(&self, image: &PixelBuffer, target: &OutputTarget) -> Result<PathBuf>;
}

/// `$HOME/Pictures/GradientGenerator`, or `./GradientGenerator` if there is no home
pub fn default_directory() -> PathBuf {
    match std::env::var_os("HOME") {
        Some(home) if !home.is_empty() => {
            PathBuf::from(home).join("Pictures").join("GradientGenerator")
        }
        _ => PathBuf::from("GradientGenerator"),
    }
}

/// Writes PNG files, existing files are overwritten
#[derive(Debug, Clone)]
pub struct FileStorage {
    default_dir: PathBuf,
}

impl FileStorage {
    /// `default_dir` is used whenever the requested directory does not exist
    pub fn new(default_dir: impl Into<PathBuf>) -> Self {
        Self {
            default_dir: default_dir.into(),
        }
    }

    pub fn default_dir(&self) -> &Path {
        &self.default_dir
    }

    /// Directory the target will actually be written to
    fn resolve_dir(&self, target: &OutputTarget) -> Result<PathBuf> {
        if target.directory.is_dir() {
            return Ok(target.directory.clone());
        }
        if !target.directory.as_os_str().is_empty() {
            tracing::warn!(
                "[save] directory {} does not exist, using {}",
                target.directory.display(),
                self.default_dir.display()
            );
        }
        std::fs::create_dir_all(&self.default_dir).map_err(|error| RenderError::Persistence {
            path: self.default_dir.clone(),
            reason: error.to_string(),
        })?;
        Ok(self.default_dir.clone())
    }
}

impl Default for FileStorage {
    fn default() -> Self {
        Self::new(default_directory())
    }
}

impl Storage for FileStorage {
    fn save(&self, image: &PixelBuffer, target: &OutputTarget) -> Result<PathBuf> {
        let path = OutputTarget::new(self.resolve_dir(target)?, target.file_stem.as_str()).path();
        let failed = |reason: String| RenderError::Persistence {
            path: path.clone(),
            reason,
        };
        if image.size().is_empty() {
            return Err(failed(format!("image has no area ({})", image.size())));
        }
        let file = File::create(&path).map_err(|error| failed(error.to_string()))?;
        let mut writer = BufWriter::new(file);
        image
            .write_png(&mut writer)
            .map_err(|error| failed(error.to_string()))?;
        writer.flush().map_err(|error| failed(error.to_string()))?;
        tracing::debug!("[save] {} {}", image.size(), path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RGBA, Size};

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join(format!("fancytext-storage-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_target_path() {
        let target = OutputTarget::new("/tmp/out", "1234");
        assert_eq!(target.path(), PathBuf::from("/tmp/out/1234.png"));
    }

    #[test]
    fn test_save() -> Result<(), Box<dyn std::error::Error>> {
        let dir = scratch("save");
        std::fs::create_dir_all(&dir)?;
        let storage = FileStorage::new(dir.join("fallback"));
        let image =
            PixelBuffer::new_with(Size::new(3, 2), |_, col| RGBA::new(col as u8, 0, 0, 255));

        let path = storage.save(&image, &OutputTarget::new(&dir, "first"))?;
        assert_eq!(path, dir.join("first.png"));
        let decoded = ::image::open(&path)?.into_rgba8();
        assert_eq!(decoded.dimensions(), (3, 2));

        // overwrite
        let path = storage.save(&image, &OutputTarget::new(&dir, "first"))?;
        assert_eq!(path, dir.join("first.png"));

        std::fs::remove_dir_all(&dir)?;
        Ok(())
    }

    #[test]
    fn test_save_fallback() -> Result<(), Box<dyn std::error::Error>> {
        let dir = scratch("fallback");
        let storage = FileStorage::new(dir.join("default"));
        let image = PixelBuffer::new_with(Size::new(1, 1), |_, _| RGBA::WHITE);
        let path = storage.save(&image, &OutputTarget::new(dir.join("missing"), "out"))?;
        assert_eq!(path, dir.join("default").join("out.png"));
        assert!(path.is_file());
        std::fs::remove_dir_all(&dir)?;
        Ok(())
    }

    #[test]
    fn test_save_empty() {
        let dir = scratch("empty");
        let storage = FileStorage::new(&dir);
        let image = PixelBuffer::new_default(Size::new(0, 5));
        assert!(matches!(
            storage.save(&image, &OutputTarget::new(&dir, "none")),
            Err(RenderError::Persistence { .. })
        ));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
