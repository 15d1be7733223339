use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use divinity_locale::export::{export_data_as_xml, ExportFlags};
use divinity_locale::import::import_files_as_entries;
use divinity_locale::io::DefaultResourceIo;
use divinity_locale::storage::{backup_data_files, find_locale_files, load_resource_with, save_data_files};
use divinity_locale::{LocaleFile, SUPPORTED_EXTENSIONS};

#[derive(Parser)]
#[command(name = "divinity_locale")]
#[command(about = "查看、导入与导出 Divinity 本地化资源（LSB/LSJ/LSX）中的条目")]
#[command(version)]
struct Cli {
    /// 输入资源文件或目录（目录会被递归扫描）
    #[arg(short, long)]
    input: PathBuf,

    /// 导出所有条目为 <content> 标记行
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// 从分隔文本（txt/tsv/csv）或资源文件导入条目到输入文件并保存
    #[arg(long)]
    import: Option<PathBuf>,

    /// 在其他操作之前把输入文件备份到该目录
    #[arg(long)]
    backup: Option<PathBuf>,

    /// 显示文件统计信息
    #[arg(long)]
    stats: bool,

    /// 保持资源中的条目顺序（默认按键排序）
    #[arg(long)]
    unsorted: bool,

    /// 静默模式(仅输出错误)
    #[arg(long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.quiet);
    run(&cli)
}

/// 按命令行参数依次执行备份、导入、统计与导出
fn run(cli: &Cli) -> Result<()> {
    validate_input(&cli.input)?;
    let mut files = load_input(cli)?;

    if let Some(backup_dir) = &cli.backup {
        handle_backup(cli, &files, backup_dir);
    }

    if let Some(import_path) = &cli.import {
        handle_import(cli, &mut files, import_path)?;
    }

    if cli.stats {
        for file in &files {
            println!("{}", file.get_stats());
        }
    }

    if let Some(export_path) = &cli.export {
        handle_export(cli, &mut files, export_path)?;
    }

    let acted = cli.stats || cli.export.is_some() || cli.import.is_some() || cli.backup.is_some();
    if !cli.quiet && !acted {
        print_summary(&files);
    }

    Ok(())
}

/// 初始化日志（RUST_LOG 优先）
fn init_logging(quiet: bool) {
    let default_level = if quiet { "error" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// 验证输入路径
fn validate_input(input: &Path) -> Result<()> {
    if !input.exists() {
        bail!("输入路径不存在: {:?}", input);
    }

    if input.is_file() {
        let extension = input
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase());

        if !SUPPORTED_EXTENSIONS.iter().any(|&ext| Some(ext) == extension.as_deref()) {
            bail!("输入文件必须是 LSB、LSJ 或 LSX 文件");
        }
    }

    Ok(())
}

/// 加载输入文件或目录
fn load_input(cli: &Cli) -> Result<Vec<LocaleFile>> {
    let sort = !cli.unsorted;

    if cli.input.is_file() {
        let file = load_resource_with(&DefaultResourceIo, &cli.input, sort)
            .with_context(|| format!("加载本地化文件失败: {:?}", cli.input))?;
        return Ok(vec![file]);
    }

    let paths = find_locale_files(&cli.input);
    let files: Vec<LocaleFile> = paths
        .iter()
        .filter_map(|path| match load_resource_with(&DefaultResourceIo, path, sort) {
            Ok(file) => Some(file),
            Err(e) => {
                tracing::warn!(path = %path.display(), "跳过无法加载的文件: {}", e);
                None
            }
        })
        .collect();

    if files.is_empty() {
        bail!("目录中没有可加载的本地化文件: {:?}", cli.input);
    }
    Ok(files)
}

/// 处理备份
fn handle_backup(cli: &Cli, files: &[LocaleFile], backup_dir: &Path) {
    let count = backup_data_files(files, backup_dir);
    if !cli.quiet {
        println!("已备份 {} 个文件到: {:?}", count, backup_dir);
    }
}

/// 处理导入（仅支持单个输入文件）
fn handle_import(cli: &Cli, files: &mut [LocaleFile], import_path: &Path) -> Result<()> {
    if !import_path.exists() {
        bail!("导入文件不存在: {:?}", import_path);
    }

    let [file] = files else {
        bail!("导入需要单个输入文件，而不是目录");
    };

    let count = import_files_as_entries(&DefaultResourceIo, &[import_path.to_path_buf()], file);
    if count == 0 {
        bail!("没有从 {:?} 导入任何条目", import_path);
    }

    let saved = save_data_files(&DefaultResourceIo, std::slice::from_mut(file));
    if saved == 0 {
        bail!("保存失败: {:?}", file.source);
    }

    if !cli.quiet {
        println!("已导入 {} 个条目，保存到: {:?}", count, file.source);
    }
    Ok(())
}

/// 处理导出（全部条目）
fn handle_export(cli: &Cli, files: &mut [LocaleFile], export_path: &Path) -> Result<()> {
    let mut output = String::new();
    let mut total = 0;
    for file in files.iter_mut() {
        file.set_all_selected(true);
        total += file.len();
        output.push_str(&export_data_as_xml(file, ExportFlags::default()));
    }

    std::fs::write(export_path, output).with_context(|| format!("写入导出文件失败: {:?}", export_path))?;

    if !cli.quiet {
        println!("已导出 {} 个条目到: {:?}", total, export_path);
    }
    Ok(())
}

/// 打印加载摘要
fn print_summary(files: &[LocaleFile]) {
    for file in files {
        println!("{} ({} 个条目)", file.name, file.len());

        for (i, entry) in file.entries.iter().take(3).enumerate() {
            let content = if entry.content().chars().count() > 50 {
                format!("{}...", entry.content().chars().take(50).collect::<String>())
            } else {
                entry.content().to_string()
            };
            println!("  {}. [{}] {}: \"{}\"", i + 1, entry.handle(), entry.key(), content);
        }
        if file.len() > 3 {
            println!("  ... 还有 {} 个条目", file.len() - 3);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use divinity_locale::storage::{create_file_data, save_data_file};
    use tempfile::TempDir;

    fn write_default_file(dir: &Path) -> PathBuf {
        let path = dir.join("English.lsb");
        let file = create_file_data(path.clone(), "English.lsb").unwrap();
        assert_eq!(save_data_file(&DefaultResourceIo, &file), 1);
        path
    }

    #[test]
    fn test_stats_then_export() {
        let temp_dir = TempDir::new().unwrap();
        let input = write_default_file(temp_dir.path());
        let output = temp_dir.path().join("export.xml");

        let cli = Cli::parse_from([
            "divinity_locale",
            "--input",
            input.to_str().unwrap(),
            "--stats",
            "--export",
            output.to_str().unwrap(),
            "--quiet",
        ]);
        run(&cli).unwrap();

        let exported = std::fs::read_to_string(&output).unwrap();
        assert!(exported.contains("<content contentuid="));
    }

    #[test]
    fn test_rejects_unsupported_input() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("notes.txt");
        std::fs::write(&input, "hello").unwrap();

        assert!(validate_input(&input).is_err());
        assert!(validate_input(&temp_dir.path().join("missing.lsb")).is_err());
    }
}
