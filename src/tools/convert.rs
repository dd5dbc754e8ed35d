use std::io::{self, BufRead, Write};

use crate::convert::{convert_file, ConversionMode, ConversionResult};
use crate::prompt::Prompter;

enum MenuChoice {
    Convert(ConversionMode),
    Exit,
}

fn parse_choice(answer: &str) -> Option<MenuChoice> {
    match answer {
        "1" => Some(MenuChoice::Convert(ConversionMode::Linked)),
        "2" => Some(MenuChoice::Convert(ConversionMode::Inline)),
        "3" => Some(MenuChoice::Exit),
        _ => None,
    }
}

fn ask_choice<R: BufRead, W: Write>(prompter: &mut Prompter<R, W>) -> io::Result<MenuChoice> {
    prompter.say("请选择转换模式：")?;
    prompter.say("1. 多级目录模式（使用nextUrl，生成多个索引文件）")?;
    prompter.say("2. 单文件模式（使用内联children，生成单个JSON文件）")?;
    prompter.say("3. 退出程序")?;
    loop {
        let answer = prompter.ask("请输入选项 (1/2/3)：")?;
        match parse_choice(&answer) {
            Some(choice) => return Ok(choice),
            None => prompter.error("无效选项，请输入1、2或3")?,
        }
    }
}

fn print_result<R: BufRead, W: Write>(prompter: &mut Prompter<R, W>, result: &ConversionResult) -> io::Result<()> {
    let rule = "=".repeat(50);
    prompter.say(format!("\n{rule}"))?;
    prompter.success("✅ 数据转换成功！")?;
    prompter.say(format!("转换类型：{}", result.mode))?;
    prompter.say(format!("输出目录：{}", result.output_dir.display()))?;
    prompter.say(format!("主索引文件：{}", result.root_file.display()))?;
    prompter.say(format!("{rule}\n"))
}

/// Converts old mdui-site data files until the operator picks "exit".
/// Conversion errors are reported and the loop goes on.
pub fn run<R: BufRead, W: Write>(prompter: &mut Prompter<R, W>) -> io::Result<()> {
    prompter.say("FCL下载站数据源 mdui版 转 NEXT版")?;
    prompter.say("将旧版嵌套children数据文件转换为NEXT版数据源（nextUrl多级目录或单文件内联）。")?;

    loop {
        let input = prompter.existing_file("请输入旧版数据文件路径：")?;
        let output_dir = prompter.output_dir("请输入输出目录路径：")?;

        let mode = match ask_choice(prompter)? {
            MenuChoice::Convert(mode) => mode,
            MenuChoice::Exit => {
                prompter.say("感谢使用，再见！")?;
                return Ok(());
            }
        };

        match convert_file(&input, &output_dir, mode) {
            Ok(result) => print_result(prompter, &result)?,
            Err(e) => {
                tracing::warn!(input = %input.display(), error = %e, "conversion failed");
                prompter.error(format!("\n❌ 转换失败：{e}\n"))?;
            }
        }
    }
}
