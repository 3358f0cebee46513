//! Discovery of the optional helper binaries (`dig`, `stunip.py`).

use std::env;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Finds `bin` either as a path or by searching `PATH`.
///
/// An empty `bin` disables the helper. Anything containing a path separator
/// is checked as is; a bare name is searched for in every `PATH` entry. The
/// result is canonicalized.
pub fn locate(bin: &str) -> Option<PathBuf> {
    locate_in(bin, env::var_os("PATH").as_deref())
}

pub fn locate_in(bin: &str, path_var: Option<&OsStr>) -> Option<PathBuf> {
    if bin.is_empty() {
        return None;
    }

    let candidate = Path::new(bin);
    let found = if candidate.components().count() > 1 || candidate.is_absolute() {
        is_executable(candidate).then(|| candidate.to_path_buf())
    } else {
        env::split_paths(path_var?)
            .map(|dir| dir.join(bin))
            .find(|path| is_executable(path))
    }?;

    match found.canonicalize() {
        Ok(path) => Some(path),
        Err(e) => {
            tracing::debug!(path = %found.display(), "failed to canonicalize: {e}");
            Some(found)
        }
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
