mod stats;

#[cfg(test)]
mod tests;

use std::path::{Path, PathBuf};

use crate::editor::history::EntryLookup;
use crate::entry::{EntryId, LocaleEntry};
use crate::reconcile::{Encoding, ResourceFormat};
use crate::resource::{Node, NodeRef, Resource};

pub use stats::LocaleFileStats;

/// 本地化文件
///
/// 一个资源文件及其条目的有序集合。条目由文件独占，
/// 并通过弱引用指向 `resource` 中的节点。
#[derive(Debug)]
pub struct LocaleFile {
    /// 文件路径
    pub source: PathBuf,
    /// 显示名称
    pub name: String,
    /// 资源树
    pub resource: Resource,
    /// 资源格式（生命周期内不变）
    pub format: ResourceFormat,
    /// 条目列表
    pub entries: Vec<LocaleEntry>,
    /// 是否有未保存的修改
    pub changes_uncommitted: bool,
}

impl LocaleFile {
    /// 创建空文件（名称取自路径中的文件名）
    pub fn new(source: PathBuf, resource: Resource, format: ResourceFormat) -> Self {
        let name = source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            source,
            name,
            resource,
            format,
            entries: Vec::new(),
            changes_uncommitted: false,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 追加条目
    pub fn append(&mut self, entry: LocaleEntry) {
        self.entries.push(entry);
        self.changes_uncommitted = true;
    }

    /// 删除条目
    ///
    /// 平铺编码下同时把条目的节点从资源树中移除，保存后即不再包含该条目；
    /// 嵌套编码的节点属于更大的结构，保留在树中。
    pub fn remove(&mut self, id: EntryId) -> Option<LocaleEntry> {
        let index = self.entries.iter().position(|entry| entry.id() == id)?;
        let entry = self.entries.remove(index);

        if self.format.encoding() == Encoding::Flat {
            if let Some(node) = entry.source_node() {
                let parent = node.borrow().parent();
                if let Some(parent) = parent {
                    Node::remove_child(&parent, &node);
                }
            }
        }

        self.changes_uncommitted = true;
        Some(entry)
    }

    /// 按键排序（稳定、升序、按字节比较）
    pub fn sort_by_key(&mut self) {
        self.entries.sort_by(|a, b| a.key().cmp(b.key()));
    }

    /// 选出满足条件的条目（保持顺序）
    pub fn select<P>(&self, predicate: P) -> Vec<&LocaleEntry>
    where
        P: Fn(&LocaleEntry) -> bool,
    {
        self.entries.iter().filter(|entry| predicate(entry)).collect()
    }

    /// 已选中的条目
    pub fn selected(&self) -> Vec<&LocaleEntry> {
        self.select(LocaleEntry::is_selected)
    }

    pub fn set_all_selected(&mut self, selected: bool) {
        for entry in &mut self.entries {
            entry.set_selected(selected);
        }
    }

    pub fn entry(&self, id: EntryId) -> Option<&LocaleEntry> {
        self.entries.iter().find(|entry| entry.id() == id)
    }

    pub fn contains(&self, id: EntryId) -> bool {
        self.entry(id).is_some()
    }

    /// 第一个仍绑定节点的条目的源节点（用作新条目的模板）
    pub fn reference_node(&self) -> Option<NodeRef> {
        self.entries.iter().find_map(LocaleEntry::source_node)
    }

    /// 是否存在未提交的条目修改
    pub fn has_dirty_entries(&self) -> bool {
        self.entries.iter().any(LocaleEntry::is_dirty)
    }

    /// 提交修改（清除文件与条目的修改标记）
    pub fn commit_changes(&mut self) {
        self.changes_uncommitted = false;
        for entry in &mut self.entries {
            entry.commit_changes();
        }
    }

    /// 生成统计信息
    pub fn get_stats(&self) -> LocaleFileStats {
        LocaleFileStats::collect(self)
    }
}

impl EntryLookup for LocaleFile {
    fn entry_mut(&mut self, id: EntryId) -> Option<&mut LocaleEntry> {
        self.entries.entry_mut(id)
    }
}

impl EntryLookup for [LocaleFile] {
    fn entry_mut(&mut self, id: EntryId) -> Option<&mut LocaleEntry> {
        self.iter_mut().find_map(|file| file.entry_mut(id))
    }
}

impl EntryLookup for Vec<LocaleFile> {
    fn entry_mut(&mut self, id: EntryId) -> Option<&mut LocaleEntry> {
        self.as_mut_slice().entry_mut(id)
    }
}
