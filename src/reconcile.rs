/// 资源协调器
///
/// 在资源树中发现可翻译内容，并为每个节点创建一个绑定的 `LocaleEntry`。
///
/// # 编码
/// - **平铺**（`.lsb`）：第一个区域根节点的子分组直接列出条目节点，
///   键与内容按约定的属性名查找；缺少内容属性时自动合成
/// - **嵌套**（`.lsj`/`.lsx`）：可翻译字符串可能位于任意深度，
///   深度优先收集所有持有可翻译字符串的节点，键为固定的结构标签
use std::path::Path;
use serde::{Serialize, Deserialize};
use tracing::{debug, error};

use crate::config::LocaleConventions;
use crate::datatypes::NodeAttribute;
use crate::entry::{LocaleEntry, Provenance};
use crate::handle::create_handle;
use crate::locale_file::LocaleFile;
use crate::resource::{ChildGroup, NodeRef, Resource};
use crate::utils::{file_extension_found, LocaleError, Result};

/// 资源文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceFormat {
    /// 二进制字符串表
    Lsb,
    /// JSON 资源
    Lsj,
    /// XML 资源
    Lsx,
}

/// 资源结构编码
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// 平铺：条目节点直接枚举
    Flat,
    /// 嵌套：深度优先发现
    Nested,
}

impl ResourceFormat {
    /// 根据文件扩展名判断格式
    pub fn from_path(path: &Path) -> Option<Self> {
        if file_extension_found(path, &["lsb"]) {
            Some(ResourceFormat::Lsb)
        } else if file_extension_found(path, &["lsj"]) {
            Some(ResourceFormat::Lsj)
        } else if file_extension_found(path, &["lsx"]) {
            Some(ResourceFormat::Lsx)
        } else {
            None
        }
    }

    pub fn encoding(&self) -> Encoding {
        match self {
            ResourceFormat::Lsb => Encoding::Flat,
            ResourceFormat::Lsj | ResourceFormat::Lsx => Encoding::Nested,
        }
    }

    pub fn to_extension(&self) -> &'static str {
        match self {
            ResourceFormat::Lsb => "lsb",
            ResourceFormat::Lsj => "lsj",
            ResourceFormat::Lsx => "lsx",
        }
    }
}

/// 从文件持有的资源中加载条目
///
/// # 参数
/// * `file` - 目标文件（使用其 `resource` 与 `format`）
/// * `sort` - 是否按键排序（稳定、升序、按字节比较）
///
/// # 返回
/// 成功返回 true。任何错误都会中止整个协调过程，不会向文件添加部分条目，
/// 错误原因写入日志。
pub fn load_from_resource(file: &mut LocaleFile, sort: bool) -> bool {
    match collect_entries(&file.resource, file.format) {
        Ok(entries) => {
            debug!(file = %file.name, entries = entries.len(), "资源协调完成");
            file.entries.extend(entries);
            if sort {
                file.sort_by_key();
            }
            true
        }
        Err(e) => {
            error!(file = %file.name, "从资源加载条目失败: {}", e);
            false
        }
    }
}

/// 收集资源中的全部条目（按发现顺序）
pub fn collect_entries(resource: &Resource, format: ResourceFormat) -> Result<Vec<LocaleEntry>> {
    let root = resource.first_region().ok_or(LocaleError::EmptyResource)?;

    let nodes: Vec<NodeRef> = match format.encoding() {
        Encoding::Flat => root
            .borrow()
            .children
            .iter()
            .flat_map(|group| group.nodes.iter().cloned())
            .collect(),
        Encoding::Nested => {
            let mut nodes = Vec::new();
            for group in &root.borrow().children {
                find_translated_strings_in_group(group, &mut nodes);
            }
            nodes
        }
    };

    nodes
        .iter()
        .map(|node| {
            load_from_node(node, format, false).map_err(|e| match e {
                LocaleError::Binding(message) => {
                    LocaleError::Traversal(format!("node '{}': {}", node.borrow().name, message))
                }
                other => other,
            })
        })
        .collect()
}

/// 为单个节点创建条目
///
/// # 参数
/// * `node` - 源节点
/// * `format` - 资源格式
/// * `generate_new_handle` - 平铺编码下是否为内容重新生成句柄
///
/// # 错误
/// 平铺编码中内容属性存在但不是可翻译字符串时返回 `Binding`
pub fn load_from_node(node: &NodeRef, format: ResourceFormat, generate_new_handle: bool) -> Result<LocaleEntry> {
    let conventions = LocaleConventions::DEFAULT;

    match format.encoding() {
        Encoding::Flat => {
            let has_key = node.borrow().attribute(conventions.key_attribute).is_some();
            ensure_translated_string(node, conventions.content_attribute, generate_new_handle)?;

            let mut entry = LocaleEntry::new(Provenance::FreeIdentity);
            entry.bind(
                node,
                has_key.then_some(conventions.key_attribute),
                Some(conventions.content_attribute),
            )?;
            Ok(entry)
        }
        Encoding::Nested => {
            let attribute = node.borrow().translated_string_attribute().map(str::to_string);

            let mut entry = LocaleEntry::new(Provenance::StructuralIdentity);
            entry.bind(node, None, attribute.as_deref())?;
            entry.set_key(conventions.structural_key, None);
            entry.commit_changes();
            Ok(entry)
        }
    }
}

/// 确保节点上存在指定名称的可翻译字符串属性
fn ensure_translated_string(node: &NodeRef, name: &str, generate_new_handle: bool) -> Result<()> {
    let mut inner = node.borrow_mut();
    if inner.attribute(name).is_none() {
        inner.set_attribute(name, NodeAttribute::translated_string(create_handle(), ""));
        return Ok(());
    }

    let node_name = inner.name.clone();
    let ts = inner
        .attribute_mut(name)
        .and_then(NodeAttribute::as_translated_string_mut)
        .ok_or_else(|| {
            LocaleError::Binding(format!(
                "attribute '{}' of node '{}' is not a translated string",
                name, node_name
            ))
        })?;
    if generate_new_handle {
        ts.handle = create_handle();
    }

    Ok(())
}

/// 深度优先收集分组中所有持有可翻译字符串的节点
fn find_translated_strings_in_group(group: &ChildGroup, nodes: &mut Vec<NodeRef>) {
    for node in &group.nodes {
        find_translated_strings_in_node(node, nodes);
    }
}

fn find_translated_strings_in_node(node: &NodeRef, nodes: &mut Vec<NodeRef>) {
    let inner = node.borrow();
    if inner.has_translated_string() {
        nodes.push(node.clone());
    }

    for group in &inner.children {
        find_translated_strings_in_group(group, nodes);
    }
}
