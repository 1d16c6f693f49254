//! Asset provisioning: make sure the models directory holds the complete asset
//! set, unpacking it from a zip bundle when needed.
//!
//! Extraction goes through a staging directory inside the models directory and
//! entries are moved into place without ever overwriting an existing file, so
//! two workers provisioning the same directory at once both end up with the
//! same complete set.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use arxivist_core::{AssetSet, RequiredAsset};
use tracing::{debug, info, warn};

use crate::ProvisioningError;

/// How deep to look for a nested asset root inside an extracted bundle.
const MAX_NESTING: usize = 3;

/// Guarantee that `base_dir` contains every required asset.
///
/// - All present: returns without touching the filesystem.
/// - Missing and `archive` given: unpacks the archive into `base_dir`
///   (creating it) and re-checks.
/// - Missing and no archive: fails listing every missing path.
pub fn ensure(base_dir: &Path, archive: Option<&Path>) -> Result<(), ProvisioningError> {
    let assets = AssetSet::new(base_dir);
    let missing = assets.missing();
    if missing.is_empty() {
        debug!(models_dir = %base_dir.display(), "asset set complete");
        return Ok(());
    }

    let Some(archive) = archive else {
        return Err(ProvisioningError::MissingAssets {
            base_dir: base_dir.to_path_buf(),
            missing,
        });
    };

    if !archive.is_file() {
        return Err(ProvisioningError::ArchiveNotFound(archive.to_path_buf()));
    }

    info!(
        missing = missing.len(),
        archive = %archive.display(),
        models_dir = %base_dir.display(),
        "extracting model bundle"
    );
    fs::create_dir_all(base_dir)?;
    extract_into(archive, base_dir)?;

    let still_missing = assets.missing();
    if !still_missing.is_empty() {
        return Err(ProvisioningError::IncompleteAfterExtract {
            archive: archive.to_path_buf(),
            missing: still_missing,
        });
    }

    info!(models_dir = %base_dir.display(), "asset set provisioned");
    Ok(())
}

fn extract_into(archive: &Path, base_dir: &Path) -> Result<(), ProvisioningError> {
    let staging = tempfile::Builder::new()
        .prefix(".extract-")
        .tempdir_in(base_dir)?;

    let mut zip = zip::ZipArchive::new(File::open(archive)?)?;
    debug!(entries = zip.len(), staging = %staging.path().display(), "unpacking");
    zip.extract(staging.path())?;

    let root = locate_asset_root(staging.path())?;
    if root != staging.path() {
        info!(nested = %root.display(), "bundle has an extra top-level folder, hoisting");
    }
    merge_into(&root, base_dir)?;

    if let Err(e) = staging.close() {
        warn!(error = %e, "failed to remove extraction staging directory");
    }
    Ok(())
}

/// Find the directory inside an extracted bundle that holds the asset layout.
///
/// Prefers `staged` itself; otherwise the first (by name) nested directory,
/// up to [`MAX_NESTING`] levels down, that contains the classifier graph.
/// Falls back to `staged` so the caller can report what is missing.
fn locate_asset_root(staged: &Path) -> io::Result<PathBuf> {
    let marker = RequiredAsset::ClassifierGraph.relative_path();
    if staged.join(&marker).exists() {
        return Ok(staged.to_path_buf());
    }

    let mut frontier = vec![staged.to_path_buf()];
    for _ in 0..MAX_NESTING {
        let mut next = Vec::new();
        for dir in &frontier {
            for child in sorted_subdirs(dir)? {
                if child.join(&marker).exists() {
                    return Ok(child);
                }
                next.push(child);
            }
        }
        frontier = next;
    }
    Ok(staged.to_path_buf())
}

fn sorted_subdirs(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            dirs.push(entry.path());
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Move every entry of `src` into `dest`, recursing into directories that
/// already exist. Existing files in `dest` are left untouched.
fn merge_into(src: &Path, dest: &Path) -> io::Result<()> {
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let from = entry.path();
        let to = dest.join(entry.file_name());

        if to.exists() {
            if from.is_dir() && to.is_dir() {
                merge_into(&from, &to)?;
            } else {
                debug!(path = %to.display(), "already present, keeping existing");
            }
            continue;
        }

        if let Err(e) = fs::rename(&from, &to) {
            // Another worker may have moved the same entry in first.
            if to.exists() {
                debug!(path = %to.display(), "created concurrently, keeping existing");
            } else {
                return Err(e);
            }
        }
    }
    Ok(())
}
