//! Image list construction.

use crate::constants::images::{
    DOWNSAMPLED_PREFIX, FULL_RES_DIR, IMAGE_LIST_FILE, REGISTERED_LIST_FILE, SUFFIXES,
    UNIT_FACTOR_RANGE,
};
use crate::error::{Error, Result};
use crate::images::npy;
use crate::settings::ImageOrder;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::{DirEntry, WalkDir};

/// Where the image paths came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    /// Loaded from `registered_image_list.npy`.
    Registered,
    /// Found by scanning the image directory.
    Scanned,
}

impl std::fmt::Display for ImageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Registered => write!(f, "registered list"),
            Self::Scanned => write!(f, "directory scan"),
        }
    }
}

/// A non-empty list of image paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageList {
    /// Selected image directory.
    pub image_dir: PathBuf,
    /// Origin of the entries.
    pub source: ImageSource,
    /// Image paths in output order.
    pub paths: Vec<PathBuf>,
}

/// Name of the image directory for a downsampling factor.
///
/// A factor in `[0.999, 1.001]` selects `images`, or `images_1` when
/// `images` does not exist. Any other factor is rounded half-to-even.
pub fn image_dir_name(data_path: &Path, factor: f64) -> String {
    if UNIT_FACTOR_RANGE.contains(&factor) {
        if data_path.join(FULL_RES_DIR).is_dir() {
            FULL_RES_DIR.to_string()
        } else {
            format!("{DOWNSAMPLED_PREFIX}1")
        }
    } else {
        #[allow(clippy::cast_possible_truncation)]
        let rounded = factor.round_ties_even() as i64;
        format!("{DOWNSAMPLED_PREFIX}{rounded}")
    }
}

/// Full path of the image directory for a downsampling factor.
pub fn image_dir_for(data_path: &Path, factor: f64) -> PathBuf {
    data_path.join(image_dir_name(data_path, factor))
}

fn is_image_file(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy())
        .is_some_and(|name| SUFFIXES.iter().any(|suffix| name.ends_with(suffix)))
}

/// Regular files, and symlinks whose target is a file.
fn is_file_entry(entry: &DirEntry) -> bool {
    let file_type = entry.file_type();
    file_type.is_file() || (file_type.is_symlink() && entry.path().is_file())
}

fn scan_image_dir(image_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(image_dir).min_depth(1) {
        let entry = entry.map_err(|e| Error::Io(e.into()))?;
        if is_file_entry(&entry) && is_image_file(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Collect the image paths for `data_path` at `factor`.
///
/// Uses `registered_image_list.npy` when present, otherwise scans the image
/// directory recursively. Scanned lists are always sorted; registered lists
/// are sorted unless `order` is [`ImageOrder::Registered`].
pub fn collect_images(data_path: &Path, factor: f64, order: ImageOrder) -> Result<ImageList> {
    let image_dir = image_dir_for(data_path, factor);
    let registered = data_path.join(REGISTERED_LIST_FILE);

    let (source, mut paths) = if registered.is_file() {
        info!("Loading image list from {}", registered.display());
        if !image_dir.is_dir() {
            warn!("Image directory does not exist: {}", image_dir.display());
        }
        let names = npy::read_string_array(&registered)?;
        let paths = names.iter().map(|name| image_dir.join(name)).collect();
        (ImageSource::Registered, paths)
    } else {
        if !image_dir.is_dir() {
            return Err(Error::ImageDirNotFound { path: image_dir });
        }
        (ImageSource::Scanned, scan_image_dir(&image_dir)?)
    };

    if paths.is_empty() {
        return Err(Error::EmptyImageSet { path: image_dir });
    }

    if source == ImageSource::Scanned || order == ImageOrder::Sorted {
        paths.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));
    }

    Ok(ImageList {
        image_dir,
        source,
        paths,
    })
}

/// Write `image_list.txt` into `data_path`, one path per line.
pub fn write_image_list(data_path: &Path, list: &ImageList) -> Result<PathBuf> {
    let path = data_path.join(IMAGE_LIST_FILE);

    let mut contents = String::new();
    for image in &list.paths {
        let _ = writeln!(contents, "{}", image.to_string_lossy());
    }

    std::fs::write(&path, contents).map_err(|e| Error::ImageListWrite {
        path: path.clone(),
        source: e,
    })?;
    Ok(path)
}

/// Collect images and write `image_list.txt`.
pub fn make_image_list(data_path: &Path, factor: f64, order: ImageOrder) -> Result<ImageList> {
    let list = collect_images(data_path, factor, order)?;
    let written = write_image_list(data_path, &list)?;
    info!(
        "Wrote {} image path(s) from {} to {}",
        list.paths.len(),
        list.source,
        written.display()
    );
    Ok(list)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::images::npy::tests::{encode_object, encode_unicode};
    use std::fs;
    use tempfile::TempDir;

    fn touch(base: &Path, rel: &str) {
        let path = base.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn test_unit_factor_prefers_images() {
        let data = TempDir::new().unwrap();
        fs::create_dir(data.path().join("images")).unwrap();
        for factor in [0.999, 1.0, 1.0005, 1.001] {
            assert_eq!(image_dir_name(data.path(), factor), "images");
        }
    }

    #[test]
    fn test_unit_factor_falls_back_to_images_1() {
        let data = TempDir::new().unwrap();
        assert_eq!(image_dir_name(data.path(), 1.0), "images_1");
        assert_eq!(image_dir_name(data.path(), 0.9995), "images_1");
    }

    #[test]
    fn test_other_factors_round_half_to_even() {
        let data = TempDir::new().unwrap();
        fs::create_dir(data.path().join("images")).unwrap();
        assert_eq!(image_dir_name(data.path(), 2.0), "images_2");
        assert_eq!(image_dir_name(data.path(), 3.7), "images_4");
        assert_eq!(image_dir_name(data.path(), 2.5), "images_2");
        assert_eq!(image_dir_name(data.path(), 3.5), "images_4");
        assert_eq!(image_dir_name(data.path(), 1.01), "images_1");
        assert_eq!(image_dir_name(data.path(), 0.5), "images_0");
    }

    #[test]
    fn test_scan_collects_suffixes_sorted() {
        let data = TempDir::new().unwrap();
        for rel in [
            "images_2/c.png",
            "images_2/a.jpg",
            "images_2/sub/b.JPG",
            "images_2/d.jpeg",
            "images_2/e.JPEG",
            "images_2/notes.txt",
            "images_2/f.PNG",
        ] {
            touch(data.path(), rel);
        }

        let list = collect_images(data.path(), 2.0, ImageOrder::Sorted).unwrap();
        let dir = data.path().join("images_2");
        assert_eq!(list.source, ImageSource::Scanned);
        assert_eq!(
            list.paths,
            vec![
                dir.join("a.jpg"),
                dir.join("c.png"),
                dir.join("d.jpeg"),
                dir.join("sub/b.JPG"),
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_includes_symlinked_images() {
        use std::os::unix::fs::symlink;

        let data = TempDir::new().unwrap();
        touch(data.path(), "images/a.jpg");
        touch(data.path(), "images/b.jpg");
        fs::create_dir(data.path().join("images_2")).unwrap();
        for name in ["b.jpg", "a.jpg"] {
            symlink(
                data.path().join("images").join(name),
                data.path().join("images_2").join(name),
            )
            .unwrap();
        }
        symlink(
            data.path().join("images/missing.jpg"),
            data.path().join("images_2/dangling.jpg"),
        )
        .unwrap();

        let list = collect_images(data.path(), 2.0, ImageOrder::Sorted).unwrap();
        let dir = data.path().join("images_2");
        assert_eq!(list.paths, vec![dir.join("a.jpg"), dir.join("b.jpg")]);
    }

    #[test]
    fn test_scan_sorts_even_with_registered_order_policy() {
        let data = TempDir::new().unwrap();
        touch(data.path(), "images/b.jpg");
        touch(data.path(), "images/a.jpg");
        let list = collect_images(data.path(), 1.0, ImageOrder::Registered).unwrap();
        assert_eq!(list.paths[0], data.path().join("images/a.jpg"));
    }

    #[test]
    fn test_registered_list_is_sorted_by_default() {
        let data = TempDir::new().unwrap();
        fs::create_dir(data.path().join("images")).unwrap();
        fs::write(
            data.path().join("registered_image_list.npy"),
            encode_unicode(&["b.jpg", "a.jpg"]),
        )
        .unwrap();

        let list = collect_images(data.path(), 1.0, ImageOrder::Sorted).unwrap();
        let dir = data.path().join("images");
        assert_eq!(list.source, ImageSource::Registered);
        assert_eq!(list.paths, vec![dir.join("a.jpg"), dir.join("b.jpg")]);
    }

    #[test]
    fn test_registered_object_array_is_accepted() {
        let data = TempDir::new().unwrap();
        fs::write(
            data.path().join("registered_image_list.npy"),
            encode_object(&["r_10.png", "r_2.png"]),
        )
        .unwrap();

        let list = collect_images(data.path(), 2.0, ImageOrder::Registered).unwrap();
        let dir = data.path().join("images_2");
        assert_eq!(list.source, ImageSource::Registered);
        assert_eq!(list.paths, vec![dir.join("r_10.png"), dir.join("r_2.png")]);
    }

    #[test]
    fn test_registered_order_can_be_kept() {
        let data = TempDir::new().unwrap();
        fs::create_dir(data.path().join("images")).unwrap();
        fs::write(
            data.path().join("registered_image_list.npy"),
            encode_unicode(&["b.jpg", "a.jpg"]),
        )
        .unwrap();

        let list = collect_images(data.path(), 1.0, ImageOrder::Registered).unwrap();
        let dir = data.path().join("images");
        assert_eq!(list.paths, vec![dir.join("b.jpg"), dir.join("a.jpg")]);
    }

    #[test]
    fn test_registered_list_does_not_require_files() {
        let data = TempDir::new().unwrap();
        fs::write(
            data.path().join("registered_image_list.npy"),
            encode_unicode(&["x.jpg"]),
        )
        .unwrap();
        let list = collect_images(data.path(), 4.0, ImageOrder::Sorted).unwrap();
        assert_eq!(list.paths, vec![data.path().join("images_4/x.jpg")]);
    }

    #[test]
    fn test_empty_directory_is_fatal_and_writes_nothing() {
        let data = TempDir::new().unwrap();
        fs::create_dir(data.path().join("images")).unwrap();
        touch(data.path(), "images/readme.txt");

        let result = make_image_list(data.path(), 1.0, ImageOrder::Sorted);
        assert!(matches!(result, Err(Error::EmptyImageSet { .. })));
        assert!(!data.path().join("image_list.txt").exists());
    }

    #[test]
    fn test_empty_registered_list_is_fatal() {
        let data = TempDir::new().unwrap();
        fs::write(
            data.path().join("registered_image_list.npy"),
            encode_unicode(&[]),
        )
        .unwrap();
        assert!(matches!(
            collect_images(data.path(), 1.0, ImageOrder::Sorted),
            Err(Error::EmptyImageSet { .. })
        ));
    }

    #[test]
    fn test_missing_directory_without_registered_list() {
        let data = TempDir::new().unwrap();
        assert!(matches!(
            collect_images(data.path(), 2.0, ImageOrder::Sorted),
            Err(Error::ImageDirNotFound { .. })
        ));
    }

    #[test]
    fn test_write_overwrites_with_one_path_per_line() {
        let data = TempDir::new().unwrap();
        fs::write(data.path().join("image_list.txt"), "stale\nstale\nstale\n").unwrap();
        touch(data.path(), "images_1/b.png");
        touch(data.path(), "images_1/a.png");

        make_image_list(data.path(), 1.0, ImageOrder::Sorted).unwrap();
        let written = fs::read_to_string(data.path().join("image_list.txt")).unwrap();
        let dir = data.path().join("images_1");
        assert_eq!(
            written,
            format!(
                "{}\n{}\n",
                dir.join("a.png").display(),
                dir.join("b.png").display()
            )
        );
    }
}
