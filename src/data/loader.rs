// ============================================================
// Layer 4 — Image Folder Loader
// ============================================================
// Indexes a class-per-directory image collection:
//
//   root/
//     └── <class name>/          one directory per class
//           ├── a.png
//           └── nested/b.jpg     images are found recursively
//
// Only headers are read here (to learn each image's size);
// pixels are decoded lazily by the dataset.
//
// Reference: image crate documentation
//            Rust Book §9 (Error Handling)

use anyhow::{bail, Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::domain::image_folder::{ImageFolder, LabeledImage};
use crate::domain::traits::ImageSource;

/// File extensions the decoder is built with.
pub const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

/// Loads a labelled image collection from a directory.
/// Implements the ImageSource trait from Layer 3.
pub struct ImageFolderLoader {
    /// Root directory; each sub-directory is one class
    root: PathBuf,
}

impl ImageFolderLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ImageSource for ImageFolderLoader {
    fn load(&self) -> Result<ImageFolder> {
        let root = self.root.as_path();

        // A missing dataset is fatal: there is nothing to train on.
        if !root.is_dir() {
            bail!("Dataset directory '{}' does not exist", root.display());
        }

        let classes = class_directories(root)?;
        if classes.is_empty() {
            bail!("Dataset directory '{}' has no class sub-directories", root.display());
        }

        let mut images     = Vec::new();
        let mut image_size = None::<[usize; 2]>;

        for (label, class) in classes.iter().enumerate() {
            let mut files = Vec::new();
            collect_image_files(&root.join(class), &mut files)?;
            files.sort();

            for path in files {
                // Header only; unreadable files are skipped, not fatal
                let (width, height) = match image::image_dimensions(&path) {
                    Ok(dims) => dims,
                    Err(e) => {
                        tracing::warn!("Skipping '{}': {}", path.display(), e);
                        continue;
                    }
                };
                let size = [height as usize, width as usize];

                match image_size {
                    None => image_size = Some(size),
                    Some(expected) if expected != size => bail!(
                        "Image '{}' is {}x{}, expected {}x{} like the rest of '{}'",
                        path.display(),
                        size[1],
                        size[0],
                        expected[1],
                        expected[0],
                        root.display(),
                    ),
                    Some(_) => {}
                }

                images.push(LabeledImage::new(path, label));
            }
        }

        let Some(image_size) = image_size else {
            bail!("No readable images found under '{}'", root.display());
        };

        tracing::info!(
            "Indexed {} images in {} classes from '{}'",
            images.len(),
            classes.len(),
            root.display()
        );

        Ok(ImageFolder {
            root: root.to_path_buf(),
            classes,
            images,
            image_size,
        })
    }
}

/// Sorted names of the immediate sub-directories of `root`.
fn class_directories(root: &Path) -> Result<Vec<String>> {
    let mut classes = Vec::new();

    for entry in fs::read_dir(root)
        .with_context(|| format!("Cannot read directory '{}'", root.display()))?
    {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            classes.push(entry.file_name().to_string_lossy().into_owned());
        }
    }

    classes.sort();
    Ok(classes)
}

/// Walk `dir` recursively, pushing every file with a known image extension.
fn collect_image_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)
        .with_context(|| format!("Cannot read directory '{}'", dir.display()))?
    {
        let entry = entry?;
        let path  = entry.path();

        if entry.file_type()?.is_dir() {
            collect_image_files(&path, out)?;
        } else if has_image_extension(&path) {
            out.push(path);
        }
    }
    Ok(())
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    /// Write a solid-colour PNG.
    pub(crate) fn write_png(path: &Path, width: u32, height: u32, rgb: [u8; 3]) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        RgbImage::from_pixel(width, height, Rgb(rgb)).save(path).unwrap();
    }

    #[test]
    fn test_classes_are_sorted_and_labelled() {
        let dir = tempfile::tempdir().unwrap();
        write_png(&dir.path().join("zebra/0.png"), 4, 4, [0, 0, 0]);
        write_png(&dir.path().join("ant/0.png"), 4, 4, [255, 0, 0]);
        write_png(&dir.path().join("ant/1.png"), 4, 4, [0, 255, 0]);

        let folder = ImageFolderLoader::new(dir.path()).load().unwrap();

        assert_eq!(folder.classes, vec!["ant", "zebra"]);
        assert_eq!(folder.len(), 3);
        assert_eq!(folder.class_counts(), vec![2, 1]);
        assert_eq!(folder.image_size, [4, 4]);
        assert!(folder.images[2].path.ends_with("zebra/0.png"));
        assert_eq!(folder.images[2].label, 1);
    }

    #[test]
    fn test_nested_images_are_found() {
        let dir = tempfile::tempdir().unwrap();
        write_png(&dir.path().join("a/deep/er/0.png"), 2, 2, [1, 2, 3]);

        let folder = ImageFolderLoader::new(dir.path()).load().unwrap();
        assert_eq!(folder.len(), 1);
        assert_eq!(folder.images[0].label, 0);
    }

    #[test]
    fn test_non_images_and_corrupt_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write_png(&dir.path().join("a/0.png"), 2, 2, [1, 2, 3]);
        fs::write(dir.path().join("a/notes.txt"), "hello").unwrap();
        fs::write(dir.path().join("a/broken.png"), b"not a png").unwrap();

        let folder = ImageFolderLoader::new(dir.path()).load().unwrap();
        assert_eq!(folder.len(), 1);
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ImageFolderLoader::new(dir.path().join("nope")).load().unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_mixed_image_sizes_are_an_error() {
        let dir = tempfile::tempdir().unwrap();
        write_png(&dir.path().join("a/0.png"), 4, 4, [0, 0, 0]);
        write_png(&dir.path().join("b/0.png"), 8, 4, [0, 0, 0]);

        assert!(ImageFolderLoader::new(dir.path()).load().is_err());
    }

    #[test]
    fn test_root_without_classes_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("loose.png"), b"x").unwrap();
        assert!(ImageFolderLoader::new(dir.path()).load().is_err());
    }
}
