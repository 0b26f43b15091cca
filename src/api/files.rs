//! Published installers and documentation sites on the local filesystem.

use super::{ApiError, ApiResult};
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use tracing::debug;

/// A directory of published files.
///
/// Lookups go through a capability handle, so relative paths cannot escape
/// the root.
#[derive(Debug)]
pub struct PublishedDirectory {
    root: Utf8PathBuf,
    dir: Dir,
}

impl PublishedDirectory {
    /// Opens the directory at `path`.
    ///
    /// # Errors
    ///
    /// Returns the I/O error raised while opening `path`.
    pub fn open(path: impl Into<Utf8PathBuf>) -> std::io::Result<Self> {
        let root = path.into();
        let dir = Dir::open_ambient_dir(&root, ambient_authority())?;
        Ok(Self { root, dir })
    }

    /// Returns the directory this handle was opened at.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Returns the full path of `relative` when it names a regular file
    /// inside the directory.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] when no such file exists.
    pub fn locate(&self, relative: &Utf8Path) -> ApiResult<Utf8PathBuf> {
        if self.dir.is_file(relative) {
            Ok(self.root.join(relative))
        } else {
            debug!(root = %self.root, path = %relative, "published file missing");
            Err(ApiError::NotFound(format!("file {relative}")))
        }
    }
}

/// The installer and documentation directories served to clients.
#[derive(Debug)]
pub struct PublishedFiles {
    /// Installers named `apsim-{revision}.{ext}`.
    pub installers: PublishedDirectory,
    /// One documentation site per pull request.
    pub documentation: PublishedDirectory,
}

impl PublishedFiles {
    /// Opens both directories.
    ///
    /// # Errors
    ///
    /// Returns the I/O error raised while opening either directory.
    pub fn open(
        installers: impl Into<Utf8PathBuf>,
        documentation: impl Into<Utf8PathBuf>,
    ) -> std::io::Result<Self> {
        Ok(Self {
            installers: PublishedDirectory::open(installers)?,
            documentation: PublishedDirectory::open(documentation)?,
        })
    }
}
