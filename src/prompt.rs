use std::fmt::Display;
use std::io::{self, BufRead, Write};
use std::path::{absolute, PathBuf};

use crossterm::queue;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Prompter { input, output }
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }

    /// Prints `prompt` and reads one trimmed line. Closed input is an
    /// `UnexpectedEof` error so callers can stop their loops.
    pub fn ask(&mut self, prompt: &str) -> io::Result<String> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"));
        }
        Ok(line.trim().to_string())
    }

    pub fn say(&mut self, message: impl Display) -> io::Result<()> {
        writeln!(self.output, "{message}")
    }

    fn colored(&mut self, color: Color, message: impl Display) -> io::Result<()> {
        queue!(
            self.output,
            SetForegroundColor(color),
            Print(message),
            ResetColor,
            Print("\n")
        )?;
        self.output.flush()
    }

    pub fn success(&mut self, message: impl Display) -> io::Result<()> {
        self.colored(Color::Green, message)
    }

    pub fn warn(&mut self, message: impl Display) -> io::Result<()> {
        self.colored(Color::Yellow, message)
    }

    pub fn error(&mut self, message: impl Display) -> io::Result<()> {
        self.colored(Color::Red, message)
    }

    pub fn confirm(&mut self, prompt: &str) -> io::Result<bool> {
        let answer = self.ask(prompt)?.to_lowercase();
        Ok(matches!(answer.as_str(), "y" | "yes" | "是"))
    }

    pub fn non_empty(&mut self, prompt: &str, empty_message: &str) -> io::Result<String> {
        loop {
            let answer = self.ask(prompt)?;
            if !answer.is_empty() {
                return Ok(answer);
            }
            self.error(empty_message)?;
        }
    }

    fn path(&mut self, prompt: &str) -> io::Result<PathBuf> {
        let raw = self.non_empty(prompt, "路径不能为空，请重新输入")?;
        absolute(raw)
    }

    pub fn existing_file(&mut self, prompt: &str) -> io::Result<PathBuf> {
        loop {
            let path = self.path(prompt)?;
            if path.is_file() {
                return Ok(path);
            }
            self.error(format!("错误：文件不存在 - {}", path.display()))?;
        }
    }

    pub fn existing_dir(&mut self, prompt: &str) -> io::Result<PathBuf> {
        loop {
            let path = self.path(prompt)?;
            if path.is_dir() {
                return Ok(path);
            }
            self.error(format!("错误：路径 {} 不是有效目录，请重新输入！", path.display()))?;
        }
    }

    /// Asks for a directory that may not exist yet. An existing file is
    /// refused; a missing directory has to be confirmed. The directory itself
    /// is created by whoever writes into it.
    pub fn output_dir(&mut self, prompt: &str) -> io::Result<PathBuf> {
        loop {
            let path = self.path(prompt)?;
            if path.is_file() {
                self.error(format!("错误：已存在同名文件 - {}", path.display()))?;
                continue;
            }
            if path.is_dir() || self.confirm(&format!("目录 {} 不存在，是否创建？(y/n)：", path.display()))? {
                return Ok(path);
            }
            self.warn("请重新输入输出目录路径")?;
        }
    }
}
