/// 批量导入
///
/// 支持两类来源：分隔文本（`.csv` 逗号分隔，`.tsv`/`.txt` 制表符分隔，
/// 每行 `键<分隔符>内容`）以及其他本地化资源文件。
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::config::LocaleConventions;
use crate::datatypes::decode_text;
use crate::io::ResourceReader;
use crate::locale_file::LocaleFile;
use crate::reconcile::ResourceFormat;
use crate::storage::{create_file_data, create_new_entry, load_resource_with};
use crate::utils::{file_extension_found, Result};

/// 可作为数据导入的分隔文本扩展名
pub const TEXT_IMPORT_EXTENSIONS: &[&str] = &["csv", "tsv", "txt"];

/// 根据扩展名确定分隔符
pub fn delimiter_for(path: &Path) -> Option<char> {
    if file_extension_found(path, &["csv"]) {
        Some(',')
    } else if file_extension_found(path, &["tsv", "txt"]) {
        Some('\t')
    } else {
        None
    }
}

/// 解析一行分隔文本
///
/// 空行返回 None。缺失或为空的键记为占位键，缺失的内容记为空串；
/// 内容之后的多余列被忽略。
pub fn parse_delimited_line(line: &str, delimiter: char) -> Option<(String, String)> {
    if line.trim().is_empty() {
        return None;
    }

    let conventions = LocaleConventions::DEFAULT;
    let mut columns = line.split(delimiter);
    let key = columns
        .next()
        .filter(|key| !key.is_empty())
        .unwrap_or(conventions.new_key_placeholder);
    let content = columns.next().unwrap_or("");

    Some((key.to_string(), content.to_string()))
}

/// 把分隔文本逐行导入为文件的新条目
///
/// 第一行包含 `Key\tContent` 时视为表头跳过。
///
/// # 返回
/// 新增的条目数量
pub fn import_delimited_text(file: &mut LocaleFile, text: &str, delimiter: char) -> Result<usize> {
    let conventions = LocaleConventions::DEFAULT;
    let mut imported = 0;

    for (index, line) in text.lines().enumerate() {
        if index == 0 && line.contains(conventions.import_header) {
            continue;
        }
        let Some((key, content)) = parse_delimited_line(line, delimiter) else {
            continue;
        };

        let entry = create_new_entry(file, &key, &content)?;
        file.append(entry);
        imported += 1;
    }

    Ok(imported)
}

/// 读取并导入一个分隔文本文件
fn import_text_file(file: &mut LocaleFile, path: &Path, delimiter: char) -> Result<usize> {
    let bytes = std::fs::read(path)?;
    let text = decode_text(&bytes);
    import_delimited_text(file, &text, delimiter)
}

/// 把每个来源导入为独立的本地化文件
///
/// 分隔文本生成以默认模板为基础的新文件，保存路径为
/// `target_dir/{文件名主干}.lsb`；导入了条目后删除模板自带的占位条目。
/// 资源文件直接加载。失败的来源被记录并跳过。
pub fn import_files_as_data(reader: &dyn ResourceReader, paths: &[PathBuf], target_dir: &Path) -> Vec<LocaleFile> {
    let mut imported = Vec::new();

    for path in paths {
        if let Some(delimiter) = delimiter_for(path) {
            let stem = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| "imported".to_string());
            let destination = target_dir.join(format!("{}.{}", stem, ResourceFormat::Lsb.to_extension()));
            let name = format!("{}.{}", stem, ResourceFormat::Lsb.to_extension());

            let Some(mut file) = create_file_data(destination, &name) else {
                error!(path = %path.display(), "无法创建本地化文件");
                continue;
            };

            match import_text_file(&mut file, path, delimiter) {
                Ok(count) => {
                    if file.len() > 1 {
                        let seed = file.entries[0].id();
                        file.remove(seed);
                    }
                    info!(path = %path.display(), count, "已导入分隔文本");
                    imported.push(file);
                }
                Err(e) => error!(path = %path.display(), "导入分隔文本失败: {}", e),
            }
        } else if ResourceFormat::from_path(path).is_some() {
            match load_resource_with(reader, path, true) {
                Ok(file) => {
                    debug!(path = %path.display(), entries = file.len(), "已导入资源文件");
                    imported.push(file);
                }
                Err(e) => error!(path = %path.display(), "导入资源文件失败: {}", e),
            }
        } else {
            warn!(path = %path.display(), "不支持的导入文件类型，跳过");
        }
    }

    imported
}

/// 把所有来源的条目追加到已有文件中
///
/// 分隔文本逐行生成新条目；资源文件中的条目以目标文件的节点布局重建，
/// 并沿用原有句柄。失败的来源被记录并跳过。
///
/// # 返回
/// 追加的条目总数
pub fn import_files_as_entries(reader: &dyn ResourceReader, paths: &[PathBuf], file: &mut LocaleFile) -> usize {
    let mut total = 0;

    for path in paths {
        let result = if let Some(delimiter) = delimiter_for(path) {
            import_text_file(file, path, delimiter)
        } else if ResourceFormat::from_path(path).is_some() {
            load_resource_with(reader, path, false).and_then(|source| copy_entries(&source, file))
        } else {
            warn!(path = %path.display(), "不支持的导入文件类型，跳过");
            continue;
        };

        match result {
            Ok(count) => {
                info!(path = %path.display(), count, "已导入条目");
                total += count;
            }
            Err(e) => error!(path = %path.display(), "导入条目失败: {}", e),
        }
    }

    total
}

/// 把来源文件的条目复制到目标文件
fn copy_entries(source: &LocaleFile, target: &mut LocaleFile) -> Result<usize> {
    let mut copied = 0;
    for source_entry in &source.entries {
        let mut entry = create_new_entry(target, source_entry.key(), source_entry.content())?;
        entry.set_handle(source_entry.handle(), None);
        target.append(entry);
        copied += 1;
    }
    Ok(copied)
}
