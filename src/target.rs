//! The file the host asked the panel to show.

use std::fmt;
use std::rc::Rc;

use futures::future::{self, LocalBoxFuture};
use futures::FutureExt;

use crate::error::{PanelError, Result};
use crate::router::extension_of;

/// Reads the raw bytes of a file. Fails with [`PanelError::Load`] when the
/// underlying file cannot be read.
pub trait ByteSource {
    fn read(&self) -> LocalBoxFuture<'static, Result<Vec<u8>>>;
}

/// Bytes that are already in memory.
#[derive(Clone, Debug)]
pub struct InMemory(Rc<[u8]>);

impl InMemory {
    pub fn new(bytes: impl Into<Rc<[u8]>>) -> Self {
        Self(bytes.into())
    }
}

impl ByteSource for InMemory {
    fn read(&self) -> LocalBoxFuture<'static, Result<Vec<u8>>> {
        future::ready(Ok(self.0.to_vec())).boxed_local()
    }
}

/// A file on the local filesystem (CLI and native hosts).
#[cfg(not(target_arch = "wasm32"))]
#[derive(Clone, Debug)]
pub struct FsSource(std::path::PathBuf);

#[cfg(not(target_arch = "wasm32"))]
impl FsSource {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self(path.into())
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl ByteSource for FsSource {
    fn read(&self) -> LocalBoxFuture<'static, Result<Vec<u8>>> {
        let result = std::fs::read(&self.0)
            .map_err(|e| PanelError::Load(format!("{}: {e}", self.0.display())));
        future::ready(result).boxed_local()
    }
}

/// Immutable descriptor of the file currently requested for display.
///
/// A retarget always builds a new `TargetFile`; cloning shares the byte
/// source but never allows mutation.
#[derive(Clone)]
pub struct TargetFile {
    name: String,
    path: Option<String>,
    extension: String,
    source: Rc<dyn ByteSource>,
}

impl TargetFile {
    /// Build a target from the host's file descriptor. The extension is
    /// derived from `name`.
    pub fn new(
        name: impl Into<String>,
        path: Option<String>,
        source: Rc<dyn ByteSource>,
    ) -> Self {
        let name = name.into();
        let extension = extension_of(&name);
        Self {
            name,
            path: path.filter(|p| !p.is_empty()),
            extension,
            source,
        }
    }

    /// Build a target for a filesystem path; the name is the final component.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_path(path: &std::path::Path) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let display = path.to_string_lossy().into_owned();
        Self::new(name, Some(display), Rc::new(FsSource::new(path)))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Lowercased extension without the dot; empty when the name has none.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Start reading the file's bytes.
    pub fn read_bytes(&self) -> LocalBoxFuture<'static, Result<Vec<u8>>> {
        self.source.read()
    }
}

impl fmt::Debug for TargetFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetFile")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("extension", &self.extension)
            .finish_non_exhaustive()
    }
}
