/// 文件级操作
///
/// 发现、加载、保存与备份本地化文件，以及基于默认模板创建新文件和新条目。
/// 这些公开入口不会向外传播错误：按文件返回成功数量或 `Option`，
/// 并把失败原因写入日志。
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::config::LocaleConventions;
use crate::datatypes::{AttributeValue, NodeAttribute};
use crate::entry::LocaleEntry;
use crate::handle::create_handle;
use crate::io::{DefaultResourceIo, ResourceReader, ResourceWriter};
use crate::locale_file::LocaleFile;
use crate::reconcile::{load_from_node, load_from_resource, ResourceFormat};
use crate::resource::{Node, Resource};
use crate::utils::{create_backup, file_extension_found, LocaleError, Result};

/// 目录扫描时识别的资源扩展名
pub const LOCALE_FILE_EXTENSIONS: &[&str] = &["lsb", "lsj"];

/// 递归查找目录下的本地化资源文件
///
/// 无法读取的目录会被记录并跳过。结果按路径排序。
pub fn find_locale_files(directory: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    collect_locale_files(directory, &mut files);
    files.sort();
    files
}

fn collect_locale_files(directory: &Path, files: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(directory) {
        Ok(entries) => entries,
        Err(e) => {
            error!(path = %directory.display(), "读取目录失败: {}", e);
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_locale_files(&path, files);
        } else if file_extension_found(&path, LOCALE_FILE_EXTENSIONS) {
            files.push(path);
        }
    }
}

/// 使用指定读取器加载资源文件
///
/// # 参数
/// * `reader` - 资源读取器
/// * `path` - 文件路径，格式由扩展名决定
/// * `sort` - 是否按键排序条目
///
/// 协调失败视为加载失败。
pub fn load_resource_with(reader: &dyn ResourceReader, path: &Path, sort: bool) -> Result<LocaleFile> {
    let format = ResourceFormat::from_path(path)
        .ok_or_else(|| LocaleError::UnsupportedFormat(path.display().to_string()))?;

    let resource = reader.read(path, format)?;
    let mut file = LocaleFile::new(path.to_path_buf(), resource, format);

    if !load_from_resource(&mut file, sort) {
        return Err(LocaleError::Traversal(format!(
            "failed to load entries from '{}'",
            path.display()
        )));
    }

    debug!(path = %path.display(), entries = file.len(), "已加载本地化文件");
    Ok(file)
}

/// 使用默认读取器加载资源文件（条目按键排序）
pub fn load_resource(path: &Path) -> Result<LocaleFile> {
    load_resource_with(&DefaultResourceIo, path, true)
}

/// 加载目录下的所有本地化文件
///
/// 单个文件失败不影响其他文件。
pub fn load_localization_data(reader: &dyn ResourceReader, directory: &Path) -> Vec<LocaleFile> {
    find_locale_files(directory)
        .into_iter()
        .filter_map(|path| match load_resource_with(reader, &path, true) {
            Ok(file) => Some(file),
            Err(e) => {
                error!(path = %path.display(), "加载本地化文件失败: {}", e);
                None
            }
        })
        .collect()
}

/// 保存单个文件到其来源路径
///
/// # 返回
/// 成功返回 1，失败返回 0
pub fn save_data_file(writer: &dyn ResourceWriter, file: &LocaleFile) -> usize {
    if file.source.as_os_str().is_empty() {
        warn!(file = %file.name, "文件没有保存路径，跳过");
        return 0;
    }

    info!(file = %file.name, path = %file.source.display(), "正在保存");
    match writer.write(&file.resource, &file.source, file.format) {
        Ok(()) => {
            info!(path = %file.source.display(), "已保存");
            1
        }
        Err(e) => {
            error!(path = %file.source.display(), "保存本地化资源失败: {}", e);
            0
        }
    }
}

/// 保存所有文件
///
/// 保存成功的文件会提交修改（清除未保存标记）。
///
/// # 返回
/// 保存成功的文件数量
pub fn save_data_files(writer: &dyn ResourceWriter, files: &mut [LocaleFile]) -> usize {
    let mut saved = 0;
    for file in files.iter_mut() {
        if save_data_file(writer, file) == 1 {
            file.commit_changes();
            saved += 1;
        }
    }
    info!(saved, "文件保存完成");
    saved
}

/// 把存在于磁盘上的文件复制到备份目录（文件名带时间戳）
///
/// # 返回
/// 备份成功的文件数量
pub fn backup_data_files(files: &[LocaleFile], backup_dir: &Path) -> usize {
    let sources: Vec<&Path> = files
        .iter()
        .map(LocaleFile::source)
        .filter(|path| path.is_file())
        .collect();

    if sources.is_empty() {
        info!("没有找到可备份的文件，跳过备份");
        return 0;
    }

    let mut successes = 0;
    for source in sources {
        match create_backup(source, backup_dir) {
            Ok(backup) => {
                info!(source = %source.display(), backup = %backup.display(), "已备份本地化文件");
                successes += 1;
            }
            Err(e) => error!(source = %source.display(), "备份本地化文件失败: {}", e),
        }
    }
    successes
}

/// 创建默认本地化资源
pub fn create_localization_resource() -> Option<Resource> {
    debug!("创建默认本地化资源");
    match Resource::default_locale_resource() {
        Ok(resource) => Some(resource),
        Err(e) => {
            error!("创建默认本地化资源失败: {}", e);
            None
        }
    }
}

/// 基于默认模板创建新的本地化文件
///
/// 新文件为平铺格式，包含一个占位条目，并标记为未保存。
pub fn create_file_data(destination: PathBuf, name: &str) -> Option<LocaleFile> {
    let resource = create_localization_resource()?;
    let mut file = LocaleFile::new(destination, resource, ResourceFormat::Lsb);
    file.name = name.to_string();

    if !load_from_resource(&mut file, true) {
        return None;
    }
    file.changes_uncommitted = true;
    Some(file)
}

/// 以文件中第一个已绑定节点为模板创建新条目
///
/// 新节点复制模板节点的属性布局（可翻译字符串获得新句柄，字符串清空，
/// 其他值保留），挂到模板节点所在的分组中。条目本身不会加入文件。
///
/// 键等于占位键（`NewKey`）时追加序号：`NewKey{条目数 + 1}`。
pub fn create_new_entry(file: &mut LocaleFile, key: &str, content: &str) -> Result<LocaleEntry> {
    let conventions = LocaleConventions::DEFAULT;

    let reference = file.reference_node().ok_or_else(|| {
        LocaleError::Binding(format!("file '{}' has no entry to use as a template", file.name))
    })?;

    let node = {
        let reference = reference.borrow();
        let node = Node::new_ref(reference.name.clone());
        for (name, attribute) in &reference.attributes {
            let attribute = match attribute.value {
                AttributeValue::TranslatedString(_) => NodeAttribute::translated_string(create_handle(), ""),
                AttributeValue::String(_) => NodeAttribute::new(attribute.data_type),
                _ => attribute.clone(),
            };
            node.borrow_mut().set_attribute(name.clone(), attribute);
        }
        node
    };

    let parent = reference
        .borrow()
        .parent()
        .or_else(|| file.resource.first_region().cloned())
        .ok_or(LocaleError::EmptyResource)?;
    let group = parent
        .borrow()
        .group_of(&reference)
        .map(str::to_string)
        .unwrap_or_else(|| node.borrow().name.clone());
    Node::append_child(&parent, &group, node.clone());

    let mut entry = match load_from_node(&node, file.format, false) {
        Ok(entry) => entry,
        Err(e) => {
            Node::remove_child(&parent, &node);
            return Err(e);
        }
    };

    if !entry.is_locked() {
        let key = if key == conventions.new_key_placeholder {
            format!("{}{}", key, file.entries.len() + 1)
        } else {
            key.to_string()
        };
        entry.set_key(key, None);
    }
    entry.set_content(content, None);

    Ok(entry)
}
