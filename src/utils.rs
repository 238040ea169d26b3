use crate::Result;
use anyhow::Context;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Write a file.
pub(crate) fn write(path: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> Result<()> {
    let path = path.as_ref();
    std::fs::write(path, contents).context(format!("Unable to write to {}", path.display()))
}

/// Read a file to a `String`.
pub(crate) fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read file at {}", path.display()))
}

/// Create a directory and its parents. It is not an error if it already exists.
pub(crate) fn make_dir(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    match std::fs::create_dir_all(path) {
        Ok(_) => Ok(()),
        Err(e) => match e.kind() {
            ErrorKind::AlreadyExists if path.is_dir() => Ok(()),
            _ => Err(e).context(format!("Unable to create directory {}", path.display())),
        },
    }
}

pub(crate) fn canonicalize(path: &Path) -> Result<PathBuf> {
    std::fs::canonicalize(path)
        .with_context(|| format!("Unable to canonicalize the path {}", path.display()))
}

/// Lists the file names in `dir`.
pub(crate) fn file_names(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in
        std::fs::read_dir(dir).with_context(|| format!("Unable to read directory {}", dir.display()))?
    {
        let entry = entry.context("Failed to read directory entry")?;
        names.push(entry.file_name().to_string_lossy().to_string());
    }
    Ok(names)
}

pub(crate) fn copy(from: impl AsRef<Path>, to: impl AsRef<Path>) -> Result<()> {
    std::fs::copy(from.as_ref(), to.as_ref())
        .with_context(|| {
            format!(
                "Unable to copy file from '{}' to '{}'",
                from.as_ref().display(),
                to.as_ref().display()
            )
        })
        .map(|_| ())
}

pub(crate) fn remove(path: &Path) -> Result<()> {
    std::fs::remove_file(path).with_context(|| format!("Unable to remove {}", path.display()))
}

/// Resolves `p` against `root` when it is relative.
pub(crate) fn resolve(root: &Path, p: &Path) -> PathBuf {
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        root.join(p)
    }
}
