//! Test helpers for the spectra workspace
//!
//! Integration tests write rendered figures and strips to
//! `<workspace>/test_output/` so they can be inspected after a run. This
//! crate locates the workspace root and manages that directory.

use once_cell::sync::Lazy;
use std::env;
use std::path::{Path, PathBuf};

/// Error type for test helper operations
#[derive(thiserror::Error, Debug)]
pub enum TestHelperError {
    #[error("Workspace root not found above {0}")]
    WorkspaceNotFound(PathBuf),

    #[error("Artifact I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode artifact image: {0}")]
    Image(#[from] image::ImageError),
}

/// Walk up from `start` to the directory whose Cargo.toml declares `[workspace]`.
pub fn find_workspace_root_from(start: &Path) -> Result<PathBuf, TestHelperError> {
    for dir in start.ancestors() {
        let manifest = dir.join("Cargo.toml");
        if manifest.is_file() && std::fs::read_to_string(&manifest)?.contains("[workspace]") {
            return Ok(dir.to_path_buf());
        }
    }
    Err(TestHelperError::WorkspaceNotFound(start.to_path_buf()))
}

/// Workspace root found from the current directory
pub fn find_project_root() -> Result<PathBuf, TestHelperError> {
    find_workspace_root_from(&env::current_dir()?)
}

static PROJECT_ROOT: Lazy<PathBuf> =
    Lazy::new(|| find_project_root().expect("tests must run inside the workspace"));

/// Directory for test artifacts, created on first use.
pub fn get_output_dir() -> PathBuf {
    let output_dir = PROJECT_ROOT.join("test_output");
    std::fs::create_dir_all(&output_dir).expect("Failed to create test_output directory");
    output_dir
}

/// Path of an artifact inside the output directory.
///
/// Parent directories of nested paths such as `"strips/sun.png"` are created.
pub fn output_path<P: AsRef<Path>>(path: P) -> PathBuf {
    let full = get_output_dir().join(path);
    if let Some(parent) = full.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create artifact directory");
    }
    full
}

/// Save an image artifact and return where it was written.
pub fn save_image_artifact<P, I>(name: P, image: &I) -> Result<PathBuf, TestHelperError>
where
    P: AsRef<Path>,
    I: Into<image::DynamicImage> + Clone,
{
    let path = output_path(name);
    let dynamic: image::DynamicImage = image.clone().into();
    dynamic.save(&path)?;
    Ok(path)
}
