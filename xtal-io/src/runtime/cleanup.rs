use std::fs;
use std::io::{self, ErrorKind};
use std::mem;
use std::path::{Path, PathBuf};

use log::{debug, error};

/// Paths that must not outlive the process: partial session logs and the
/// optional swap file.
#[derive(Debug, Default)]
pub struct TempFiles {
    paths: Vec<PathBuf>,
    swap_path: Option<PathBuf>,
}

#[derive(Debug, Default)]
pub struct CleanupReport {
    pub removed: Vec<PathBuf>,
    pub failures: Vec<(PathBuf, io::Error)>,
}

impl CleanupReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

impl TempFiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        if !self.paths.contains(&path) {
            self.paths.push(path);
        }
    }

    pub fn unregister(&mut self, path: &Path) {
        self.paths.retain(|p| p != path);
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn set_swap_path(&mut self, path: Option<PathBuf>) {
        self.swap_path = path;
    }

    pub fn swap_path(&self) -> Option<&Path> {
        self.swap_path.as_deref()
    }

    /// Removes every registered path. The registry is emptied whatever the
    /// outcome; failures are reported, never raised.
    pub fn ensure_removed(&mut self) -> CleanupReport {
        self.remove_registered(&[])
    }

    /// [`TempFiles::ensure_removed`] plus removal of the swap path.
    pub fn clean(&mut self) -> CleanupReport {
        self.clean_except(&[])
    }

    /// [`TempFiles::clean`] that leaves the paths in `in_use` on disk and
    /// registered.
    pub fn clean_except(&mut self, in_use: &[PathBuf]) -> CleanupReport {
        let mut report = self.remove_registered(in_use);
        if let Some(swap_path) = self.swap_path.take() {
            remove_path(swap_path, &mut report);
        }
        report
    }

    fn remove_registered(&mut self, in_use: &[PathBuf]) -> CleanupReport {
        let (kept, doomed): (Vec<_>, Vec<_>) = mem::take(&mut self.paths)
            .into_iter()
            .partition(|path| in_use.contains(path));
        self.paths = kept;

        let mut report = CleanupReport::default();
        for path in doomed {
            remove_path(path, &mut report);
        }
        report
    }
}

fn remove_path(path: PathBuf, report: &mut CleanupReport) {
    let result = if path.is_dir() {
        fs::remove_dir_all(&path)
    } else {
        fs::remove_file(&path)
    };

    match result {
        Ok(()) => {
            debug!("Removed temp file {}", path.display());
            report.removed.push(path);
        }
        Err(err) if err.kind() == ErrorKind::NotFound => {}
        Err(err) => {
            error!("Unable to remove {}: {}", path.display(), err);
            report.failures.push((path, err));
        }
    }
}
