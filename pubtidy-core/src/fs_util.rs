//! Small filesystem helpers used by the patcher and the relocator.

use camino::Utf8Path;
use fs_err as fs;
use std::io;
use tracing::debug;

pub fn path_exists(path: &Utf8Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Copies `src` to `dst`, returning the number of bytes copied.
pub fn copy_file(src: &Utf8Path, dst: &Utf8Path) -> io::Result<u64> {
    fs::copy(src, dst)
}

/// Creates `path` and its parents (mode 0o777 before umask on unix).
/// Returns false when the directory could not be created.
pub fn ensure_dir_exists(path: &Utf8Path) -> bool {
    if path.is_dir() {
        return true;
    }
    match create_dir_all(path) {
        Ok(()) => true,
        Err(e) => {
            debug!(path = %path, error = %e, "cannot create directory");
            path.is_dir()
        }
    }
}

#[cfg(unix)]
fn create_dir_all(path: &Utf8Path) -> io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    std::fs::DirBuilder::new()
        .recursive(true)
        .mode(0o777)
        .create(path)
}

#[cfg(not(unix))]
fn create_dir_all(path: &Utf8Path) -> io::Result<()> {
    fs::create_dir_all(path)
}

/// Removes `dir` when it has no entries left. Errors are ignored.
pub(crate) fn remove_if_empty(dir: &Utf8Path) -> bool {
    let empty = match fs::read_dir(dir) {
        Ok(mut entries) => entries.next().is_none(),
        Err(_) => return false,
    };
    empty && fs::remove_dir(dir).is_ok()
}
