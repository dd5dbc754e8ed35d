use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;

use crate::error::{ConvertError, ConvertResult};

/// Renders `value` the way the site's data files are stored: two-space
/// indentation, non-ASCII kept literal, no trailing newline.
pub fn to_json_string<T: Serialize + ?Sized>(value: &T) -> ConvertResult<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

pub fn create_dir(path: &Path) -> ConvertResult<()> {
    fs::create_dir_all(path).map_err(|e| ConvertError::from_io(path, e))
}

pub fn write_file(path: &Path, contents: &str) -> ConvertResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_dir(parent)?;
    }
    fs::write(path, contents).map_err(|e| ConvertError::from_io(path, e))
}

pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> ConvertResult<()> {
    write_file(path, &to_json_string(value)?)
}

/// Turns a catalog name into a path relative to an output directory,
/// refusing names that are empty or would leave that directory.
pub fn relative_subpath(name: &str) -> ConvertResult<PathBuf> {
    let path = Path::new(name);
    let valid = !name.trim().is_empty()
        && path.components().all(|component| matches!(component, Component::Normal(_)));
    if valid {
        Ok(path.to_path_buf())
    } else {
        Err(ConvertError::Schema(format!("名称 {name:?} 不能用作输出路径")))
    }
}

/// First path among `path`, `stem_1.ext`, `stem_2.ext`, ... that does not exist.
pub fn next_available_path(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }
    let stem = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    let ext = path.extension().map(|e| e.to_string_lossy().into_owned());
    let mut counter = 1usize;
    loop {
        let file_name = match &ext {
            Some(ext) => format!("{stem}_{counter}.{ext}"),
            None => format!("{stem}_{counter}"),
        };
        let candidate = path.with_file_name(file_name);
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

/// Copies `source` to a fresh `<backup_dir>/<file name>.bak` and returns the
/// path of the copy.
pub fn backup_file(source: &Path, backup_dir: &Path) -> ConvertResult<PathBuf> {
    let file_name = source.file_name().ok_or_else(|| ConvertError::Io {
        path: source.to_path_buf(),
        source: io::Error::new(io::ErrorKind::InvalidInput, "路径没有文件名，无法备份"),
    })?;
    create_dir(backup_dir)?;
    let mut backup_name = file_name.to_os_string();
    backup_name.push(".bak");
    let target = next_available_path(&backup_dir.join(backup_name));
    fs::copy(source, &target).map_err(|e| ConvertError::from_io(source, e))?;
    tracing::debug!(source = %source.display(), backup = %target.display(), "backed up file");
    Ok(target)
}
