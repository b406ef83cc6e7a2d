use std::io;
use std::path::Path;

/// Package-local file access used by the detector.
///
/// A missing file is `Ok(None)` from [`read_utf8`](FileProvider::read_utf8);
/// only unexpected faults are errors.
pub trait FileProvider: Send + Sync {
    fn exists(&self, root: &Path, filename: &str) -> bool;
    fn read_utf8(&self, root: &Path, filename: &str) -> io::Result<Option<String>>;
}

/// Reads straight from the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsFileProvider;

impl FileProvider for FsFileProvider {
    fn exists(&self, root: &Path, filename: &str) -> bool {
        root.join(filename).is_file()
    }

    fn read_utf8(&self, root: &Path, filename: &str) -> io::Result<Option<String>> {
        let path = root.join(filename);
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}
