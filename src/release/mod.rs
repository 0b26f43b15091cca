//! Release formatting: version strings, installer names and download links.

mod descriptor;
mod error;
mod platform;
mod view;

pub use descriptor::{DOWNLOAD_API_URL, INSTALLER_BASE_URL, ISSUE_BASE_URL, ReleaseDescriptor};
pub use error::ReleaseError;
pub use platform::Platform;
pub use view::Release;

#[cfg(test)]
mod tests;
