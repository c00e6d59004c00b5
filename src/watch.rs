use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::SystemTime;

use crate::error::{Error, Result};

// A path or glob pattern, and the files it expanded to.
#[derive(Clone)]
pub(crate) struct ExpandedPath {
    name: String,
    paths: BTreeMap<String, SystemTime>,
}

impl ExpandedPath {
    pub(crate) fn expand(name: impl Into<String>) -> Result<ExpandedPath> {
        let name = name.into();

        let globresult = glob::glob(&name).map_err(|e| Error::Pattern {
            pattern: name.clone(),
            msg: e.msg.to_string(),
        })?;
        let files = globresult.collect::<Result<Vec<_>, _>>().map_err(|e| Error::FileIo {
            path: e.path().to_path_buf(),
            source: io::Error::new(e.error().kind(), e.error().to_string()),
        })?;
        if files.is_empty() {
            return Err(Error::FileNotFound {
                path: PathBuf::from(&name),
                source: io::Error::new(io::ErrorKind::NotFound, "no file matches"),
            });
        }

        let mut paths = BTreeMap::new();
        for file in files {
            let modified = modified(&file)?;
            paths.insert(file.to_string_lossy().to_string(), modified);
        }
        debug!("{}: expanded to {} files", name, paths.len());

        Ok(ExpandedPath { name, paths })
    }

    fn changed(&self) -> bool {
        // expand the same name again.
        let mut new = match ExpandedPath::expand(&self.name) {
            Ok(p) => p,
            Err(_) => return true,
        };

        // compare old and new.
        for (path, time) in &self.paths {
            match new.paths.remove(path) {
                Some(ntime) if ntime == *time => {}
                _ => {
                    debug!("{}: changed on disk", path);
                    return true;
                }
            }
        }
        !new.paths.is_empty()
    }
}

impl<'a> IntoIterator for &'a ExpandedPath {
    type Item = &'a str;
    type IntoIter = Box<dyn Iterator<Item = &'a str> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.paths.keys().map(|p| p.as_str()))
    }
}

fn modified(path: &Path) -> Result<SystemTime> {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(|source| Error::FileIo {
            path: path.to_path_buf(),
            source,
        })
}

/// Check if loaded configuration files have changed on disk.
///
/// Attach a watcher to an [`IniFile`](crate::IniFile) with
/// [`with_watcher`](crate::IniFile::with_watcher); every file it loads
/// afterwards is recorded. Clones share the same list, so a clone can be
/// polled from another thread.
#[derive(Clone)]
pub struct Watcher {
    inner: Arc<Mutex<WatcherInner>>,
}

impl fmt::Debug for Watcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[private]")
    }
}

impl Default for Watcher {
    fn default() -> Watcher {
        let inner = WatcherInner { epaths: Vec::new() };
        Watcher {
            inner: Arc::new(Mutex::new(inner)),
        }
    }
}

struct WatcherInner {
    epaths: Vec<ExpandedPath>,
}

impl Watcher {
    /// Create a new watcher.
    pub fn new() -> Watcher {
        Watcher::default()
    }

    // A poisoned lock still holds a usable list.
    fn lock(&self) -> MutexGuard<'_, WatcherInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Add an extra file to be watched for changes.
    pub fn add_file(&self, file: impl AsRef<Path>) -> Result<()> {
        let path = file.as_ref().to_string_lossy().to_string();
        let mut paths = BTreeMap::new();
        paths.insert(path.clone(), modified(file.as_ref())?);
        // Re-expanded on every check, so '[', '*' and '?' must match literally.
        let name = glob::Pattern::escape(&path);
        self.lock().epaths.push(ExpandedPath { name, paths });
        Ok(())
    }

    pub(crate) fn add_expanded(&self, paths: ExpandedPath) {
        self.lock().epaths.push(paths);
    }

    /// Number of files being watched.
    pub fn len(&self) -> usize {
        self.lock().epaths.iter().map(|p| p.paths.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if any configuration files have changed.
    pub fn changed(&self) -> bool {
        self.lock().epaths.iter().any(|p| p.changed())
    }
}
