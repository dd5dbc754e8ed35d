//! Moves the single file of each version directory up to the root, named
//! after the directory, and removes the emptied directory.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::error::{ConvertError, ConvertResult};
use crate::prompt::Prompter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Move {
    pub dir: PathBuf,
    pub file: PathBuf,
    pub target: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Zero or several regular files; their names.
    FileCount(Vec<String>),
    Unreadable(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub dir: PathBuf,
    pub reason: SkipReason,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FlattenPlan {
    pub moves: Vec<Move>,
    pub skipped: Vec<Skipped>,
}

fn sorted_entries(dir: &Path) -> ConvertResult<Vec<fs::DirEntry>> {
    let mut entries = fs::read_dir(dir)
        .and_then(|entries| entries.collect::<io::Result<Vec<_>>>())
        .map_err(|e| ConvertError::from_io(dir, e))?;
    entries.sort_by_key(|entry| entry.file_name());
    Ok(entries)
}

fn target_for(root: &Path, dir_name: &str, file: &Path) -> PathBuf {
    let name = match file.extension() {
        Some(ext) => format!("{dir_name}.{}", ext.to_string_lossy()),
        None => dir_name.to_string(),
    };
    root.join(name)
}

fn regular_files(dir: &Path) -> ConvertResult<Vec<PathBuf>> {
    Ok(sorted_entries(dir)?
        .into_iter()
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect())
}

/// Looks at each immediate subdirectory of `root`. Only directories holding
/// exactly one regular file are planned; the rest, including directories
/// that cannot be listed, are reported as skipped.
pub fn plan(root: &Path) -> ConvertResult<FlattenPlan> {
    plan_with(root, regular_files)
}

fn plan_with(
    root: &Path,
    mut list: impl FnMut(&Path) -> ConvertResult<Vec<PathBuf>>,
) -> ConvertResult<FlattenPlan> {
    let mut plan = FlattenPlan::default();
    for entry in sorted_entries(root)? {
        let dir = entry.path();
        if !dir.is_dir() {
            continue;
        }
        let files = match list(&dir) {
            Ok(files) => files,
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "cannot list directory");
                plan.skipped.push(Skipped { dir, reason: SkipReason::Unreadable(e.to_string()) });
                continue;
            }
        };
        if let [file] = files.as_slice() {
            let dir_name = entry.file_name().to_string_lossy().into_owned();
            plan.moves.push(Move {
                target: target_for(root, &dir_name, file),
                file: file.clone(),
                dir,
            });
        } else {
            let names = files
                .iter()
                .filter_map(|f| f.file_name())
                .map(|f| f.to_string_lossy().into_owned())
                .collect();
            plan.skipped.push(Skipped { dir, reason: SkipReason::FileCount(names) });
        }
    }
    Ok(plan)
}

/// Moves the file, refusing to replace an existing target. Returns whether
/// the emptied directory could be removed too.
pub fn apply(mv: &Move) -> ConvertResult<bool> {
    if mv.target.exists() {
        return Err(ConvertError::Io {
            path: mv.target.clone(),
            source: io::Error::new(io::ErrorKind::AlreadyExists, "目标文件已存在"),
        });
    }
    fs::rename(&mv.file, &mv.target).map_err(|e| ConvertError::from_io(&mv.file, e))?;
    match fs::remove_dir(&mv.dir) {
        Ok(()) => Ok(true),
        Err(e) => {
            tracing::warn!(dir = %mv.dir.display(), error = %e, "could not remove directory");
            Ok(false)
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FlattenReport {
    pub moved: usize,
    pub skipped: usize,
    pub failed: usize,
}

pub fn flatten<R: BufRead, W: Write>(prompter: &mut Prompter<R, W>, root: &Path) -> io::Result<FlattenReport> {
    let mut report = FlattenReport::default();
    let plan = match plan(root) {
        Ok(plan) => plan,
        Err(e) => {
            prompter.error(format!("错误：无法读取目录 {} - {e}", root.display()))?;
            return Ok(report);
        }
    };

    for skipped in &plan.skipped {
        report.skipped += 1;
        match &skipped.reason {
            SkipReason::FileCount(files) => prompter.warn(format!(
                "警告：目录 {} 下文件数量异常（{} 个），跳过！文件列表：{:?}",
                skipped.dir.display(),
                files.len(),
                files
            ))?,
            SkipReason::Unreadable(error) => {
                prompter.warn(format!("警告：无法读取目录 {}，跳过！{error}", skipped.dir.display()))?
            }
        }
    }
    if plan.moves.is_empty() {
        prompter.say("没有需要移动的文件")?;
        return Ok(report);
    }
    for mv in &plan.moves {
        prompter.say(format!("{} → {}", mv.file.display(), mv.target.display()))?;
    }
    if !prompter.confirm(&format!("将移动以上 {} 个文件，是否继续？(y/n)：", plan.moves.len()))? {
        prompter.say("已取消")?;
        return Ok(report);
    }

    for mv in &plan.moves {
        match apply(mv) {
            Ok(removed) => {
                report.moved += 1;
                prompter.success(format!("✅ 成功：{} → {}", mv.file.display(), mv.target.display()))?;
                if removed {
                    prompter.say(format!("🗑️  已删除空目录：{}", mv.dir.display()))?;
                } else {
                    prompter.warn(format!("⚠️  无法删除目录 {}", mv.dir.display()))?;
                }
            }
            Err(e) => {
                report.failed += 1;
                prompter.error(format!("❌ 失败：{} - {e}，跳过！", mv.file.display()))?;
            }
        }
    }
    Ok(report)
}

pub fn run<R: BufRead, W: Write>(prompter: &mut Prompter<R, W>) -> io::Result<()> {
    prompter.say("===== 文件批量移动重命名工具 =====")?;
    let root = prompter.existing_dir("请输入根目录的完整路径：")?;
    let report = flatten(prompter, &root)?;
    prompter.say(format!(
        "\n完成：移动 {} 个，跳过 {} 个目录，失败 {} 个",
        report.moved, report.skipped, report.failed
    ))
}
