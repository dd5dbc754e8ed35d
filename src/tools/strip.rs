//! Removes the leading "click to select" placeholder entry that the old site
//! kept at the top of every list file.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use serde_json::Value;
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::{ConvertError, ConvertResult};
use crate::fsutil;
use crate::prompt::Prompter;

pub fn has_placeholder(document: &Value, prefix: &str) -> bool {
    document
        .as_array()
        .and_then(|items| items.first())
        .and_then(|first| first.get("name"))
        .and_then(Value::as_str)
        .is_some_and(|name| name.starts_with(prefix))
}

/// All `*.json` files under `root`, sorted by path. Nothing below
/// `backup_dir` is returned.
pub fn find_json_files(root: &Path, backup_dir: &Path) -> Vec<PathBuf> {
    let backups = fs::canonicalize(backup_dir).ok();
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            !(entry.file_type().is_dir()
                && backups.is_some()
                && fs::canonicalize(entry.path()).ok() == backups)
        })
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    files
}

#[derive(Debug)]
pub struct Candidate {
    pub path: PathBuf,
    pub first_name: String,
    items: Vec<Value>,
}

impl Candidate {
    /// Backs up the original file, then rewrites it without the placeholder.
    /// A failed backup leaves the file untouched.
    pub fn apply(self, backup_dir: &Path) -> ConvertResult<PathBuf> {
        let backup = fsutil::backup_file(&self.path, backup_dir)?;
        fsutil::write_json(&self.path, &self.items[1..])?;
        tracing::info!(path = %self.path.display(), backup = %backup.display(), "removed placeholder entry");
        Ok(backup)
    }
}

pub fn inspect(path: &Path, prefix: &str) -> ConvertResult<Option<Candidate>> {
    let text = fs::read_to_string(path).map_err(|e| ConvertError::from_io(path, e))?;
    let document: Value = serde_json::from_str(&text).map_err(|source| ConvertError::MalformedInput {
        path: path.to_path_buf(),
        source,
    })?;
    if !has_placeholder(&document, prefix) {
        return Ok(None);
    }
    let Value::Array(items) = document else {
        return Ok(None);
    };
    let first_name = items[0]["name"].as_str().unwrap_or_default().to_string();
    Ok(Some(Candidate {
        path: path.to_path_buf(),
        first_name,
        items,
    }))
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StripReport {
    pub scanned: usize,
    pub stripped: usize,
    pub declined: usize,
    pub not_matching: usize,
    pub failed: usize,
}

/// Walks `root` and asks before stripping each matching file. A failure on
/// one file is reported and the walk continues.
pub fn strip_all<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    root: &Path,
    config: &Config,
) -> io::Result<StripReport> {
    let mut report = StripReport::default();
    let files = find_json_files(root, &config.backup_dir);
    if files.is_empty() {
        prompter.warn(format!("在 {} 及其子目录中未找到任何JSON文件", root.display()))?;
        return Ok(report);
    }
    prompter.say(format!("找到 {} 个JSON文件", files.len()))?;

    for path in files {
        report.scanned += 1;
        prompter.say(format!("\n正在检查: {}", path.display()))?;
        let candidate = match inspect(&path, &config.placeholder_prefix) {
            Ok(Some(candidate)) => candidate,
            Ok(None) => {
                report.not_matching += 1;
                prompter.say(format!("文件不符合处理条件，跳过: {}", path.display()))?;
                continue;
            }
            Err(e @ ConvertError::MalformedInput { .. }) => {
                report.failed += 1;
                tracing::debug!(error = %e, "invalid json");
                prompter.warn(format!("JSON格式错误，跳过文件: {}", path.display()))?;
                continue;
            }
            Err(e) => {
                report.failed += 1;
                prompter.error(format!("处理文件时出错 {}: {e}", path.display()))?;
                continue;
            }
        };

        prompter.say(format!("第一个元素的name: {}", candidate.first_name))?;
        if !prompter.confirm("是否移除第一个元素? (y/n): ")? {
            report.declined += 1;
            prompter.say(format!("跳过文件: {}", path.display()))?;
            continue;
        }
        match candidate.apply(&config.backup_dir) {
            Ok(backup) => {
                report.stripped += 1;
                prompter.success(format!("已处理并保存: {}", path.display()))?;
                prompter.say(format!("备份文件: {}", backup.display()))?;
            }
            Err(e) => {
                report.failed += 1;
                prompter.error(format!("处理文件时出错 {}: {e}", path.display()))?;
            }
        }
    }
    Ok(report)
}

pub fn run<R: BufRead, W: Write>(prompter: &mut Prompter<R, W>, root: &Path, config: &Config) -> io::Result<()> {
    prompter.say("===== 移除占位首元素工具 =====")?;
    let report = strip_all(prompter, root, config)?;
    prompter.say(format!(
        "\n共检查 {} 个文件：已处理 {}，用户跳过 {}，不符合条件 {}，失败 {}",
        report.scanned, report.stripped, report.declined, report.not_matching, report.failed
    ))
}
