use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::catalog::Entry;
use crate::config::Config;
use crate::error::ConvertResult;
use crate::fsutil;
use crate::prompt::Prompter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionFile {
    pub path: PathBuf,
    pub backup: Option<PathBuf>,
    pub contents: String,
}

/// Writes `<dir>/<version>.json`, backing up an existing file first.
pub fn write_version_file(
    dir: &Path,
    version: &str,
    entries: &[Entry],
    backup_dir: &Path,
) -> ConvertResult<VersionFile> {
    let relative = fsutil::relative_subpath(&format!("{version}.json"))?;
    let path = dir.join(relative);
    let backup = if path.exists() {
        Some(fsutil::backup_file(&path, backup_dir)?)
    } else {
        None
    };
    let contents = fsutil::to_json_string(entries)?;
    fsutil::write_file(&path, &contents)?;
    tracing::info!(path = %path.display(), entries = entries.len(), "wrote version file");
    Ok(VersionFile { path, backup, contents })
}

fn ask_output_dir<R: BufRead, W: Write>(prompter: &mut Prompter<R, W>) -> io::Result<PathBuf> {
    prompter.say("\n请指定JSON文件的输出路径：")?;
    loop {
        let answer = prompter.ask("输出路径（留空则保存到当前目录）：")?;
        if answer.is_empty() {
            let cwd = std::env::current_dir()?;
            prompter.say(format!("📌 未指定输出路径，将保存到当前目录：{}", cwd.display()))?;
            return Ok(cwd);
        }
        let dir = std::path::absolute(&answer)?;
        if dir.is_dir() {
            return Ok(dir);
        }
        if dir.exists() {
            prompter.error(format!("错误：{} 不是目录", dir.display()))?;
            continue;
        }
        if !prompter.confirm(&format!("路径 {} 不存在，是否自动创建？(y/n)：", dir.display()))? {
            prompter.warn("⚠️  请重新输入有效的输出路径！")?;
            continue;
        }
        match fsutil::create_dir(&dir) {
            Ok(()) => {
                prompter.success(format!("✅ 已自动创建目录：{}", dir.display()))?;
                return Ok(dir);
            }
            Err(e) => prompter.error(format!("❌ 创建目录失败：{e}，请重新输入路径！"))?,
        }
    }
}

pub fn run<R: BufRead, W: Write>(prompter: &mut Prompter<R, W>, config: &Config) -> io::Result<()> {
    prompter.say("===== 生成架构URL JSON文件工具 =====")?;
    let version = prompter.non_empty("请输入版本名（例如：1.1.4.5）：", "错误：版本名不能为空，请重新输入！")?;
    let dir = ask_output_dir(prompter)?;

    prompter.say("\n请依次输入以下架构对应的下载URL：")?;
    let mut entries = Vec::with_capacity(config.architectures.len());
    for arch in &config.architectures {
        let url = prompter.non_empty(
            &format!("{arch} 架构的下载URL："),
            &format!("错误：{arch} 架构的URL不能为空，请重新输入！"),
        )?;
        entries.push(Entry::for_arch(arch, &url));
    }

    match write_version_file(&dir, &version, &entries, &config.backup_dir) {
        Ok(file) => {
            if let Some(backup) = &file.backup {
                prompter.say(format!("已备份原文件：{}", backup.display()))?;
            }
            prompter.success(format!("\n✅ 成功生成JSON文件：{}", file.path.display()))?;
            prompter.say("\n生成的JSON内容预览：")?;
            prompter.say(&file.contents)
        }
        Err(e) => prompter.error(format!("\n❌ 生成文件失败：{e}")),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::prompt::tests::{scripted, transcript};

    #[test]
    fn generates_one_entry_per_architecture() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("versions");
        let config = Config {
            backup_dir: dir.path().join("backups"),
            architectures: vec!["all".to_string(), "x86".to_string()],
            ..Config::default()
        };

        let mut prompter = scripted(&["", "1.1.4.5", out.to_str().unwrap(), "y", "", "http://a/all.apk", "http://a/x86.apk"]);
        run(&mut prompter, &config).unwrap();

        let expected = "[\n  {\n    \"name\": \"all 架构\",\n    \"url\": \"http://a/all.apk\"\n  },\n  {\n    \"name\": \"x86 架构\",\n    \"url\": \"http://a/x86.apk\"\n  }\n]";
        assert_eq!(fs::read_to_string(out.join("1.1.4.5.json")).unwrap(), expected);
        let log = transcript(prompter);
        assert!(log.contains("版本名不能为空"));
        assert!(log.contains("all 架构的URL不能为空"));
        assert!(log.contains(expected));
    }

    #[test]
    fn existing_version_file_is_backed_up() {
        let dir = tempfile::tempdir().unwrap();
        let backups = dir.path().join("backups");
        fs::write(dir.path().join("2.0.json"), "old").unwrap();

        let entries = vec![Entry::for_arch("x86", " http://b ")];
        let file = write_version_file(dir.path(), "2.0", &entries, &backups).unwrap();

        assert_eq!(file.backup, Some(backups.join("2.0.json.bak")));
        assert_eq!(fs::read_to_string(backups.join("2.0.json.bak")).unwrap(), "old");
        assert_eq!(
            fs::read_to_string(dir.path().join("2.0.json")).unwrap(),
            "[\n  {\n    \"name\": \"x86 架构\",\n    \"url\": \"http://b\"\n  }\n]"
        );
    }

    #[test]
    fn version_cannot_escape_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(write_version_file(dir.path(), "../up", &[], &dir.path().join("b")).is_err());
    }
}
