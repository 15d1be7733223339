/// 编辑会话模块
///
/// 持有一组本地化文件与一份共享的编辑历史。通过会话进行的字段修改都会被记录，
/// 可跨文件撤销/重做；所有修改只发生在内存中，需要显式保存。
use std::path::Path;

use super::history::{apply, Direction, EntryLookup, History, HistoryAction};
use crate::entry::{EntryField, EntryId, LocaleEntry};
use crate::io::ResourceWriter;
use crate::locale_file::LocaleFile;
use crate::resource::NodeRef;
use crate::storage::{backup_data_files, save_data_files};
use crate::utils::{LocaleError, Result};

/// 本地化编辑器
///
/// # 核心特性
/// - **Stateful**: 维护修改状态，多次修改后统一保存
/// - **可追踪**: 字段修改与重新绑定进入历史，支持撤销/重做
///
/// # 使用示例
///
/// ```rust,ignore
/// use divinity_locale::{storage, LocaleEditor};
/// use divinity_locale::io::DefaultResourceIo;
///
/// let file = storage::load_resource(Path::new("English.lsb"))?;
/// let id = file.entries[0].id();
///
/// let mut editor = LocaleEditor::new(vec![file]);
/// editor.set_content(id, "Hello")?;
/// editor.undo()?;
///
/// editor.save_all(&DefaultResourceIo);
/// ```
#[derive(Debug, Default)]
pub struct LocaleEditor {
    files: Vec<LocaleFile>,
    history: History,
}

impl LocaleEditor {
    /// 创建编辑器
    ///
    /// # 参数
    /// * `files` - 要编辑的文件
    pub fn new(files: Vec<LocaleFile>) -> Self {
        Self {
            files,
            history: History::new(),
        }
    }

    /// 添加文件
    pub fn open(&mut self, file: LocaleFile) {
        self.files.push(file);
    }

    pub fn files(&self) -> &[LocaleFile] {
        &self.files
    }

    /// 获取文件的可变引用
    ///
    /// # 警告
    /// 直接修改条目不会进入历史，撤销时可能与当前值不一致
    pub fn files_mut(&mut self) -> &mut [LocaleFile] {
        &mut self.files
    }

    /// 关闭编辑器并取回文件
    pub fn into_files(self) -> Vec<LocaleFile> {
        self.files
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// 按 ID 查找条目
    pub fn entry(&self, id: EntryId) -> Option<&LocaleEntry> {
        self.files.iter().find_map(|file| file.entry(id))
    }

    /// 设置条目的键
    ///
    /// # 错误
    /// - `EntryNotFound`: 条目不存在
    /// - `Locked`: 条目的键由结构决定，不可修改
    pub fn set_key(&mut self, id: EntryId, value: impl Into<String>) -> Result<()> {
        self.set_field(id, EntryField::Key, value)
    }

    pub fn set_content(&mut self, id: EntryId, value: impl Into<String>) -> Result<()> {
        self.set_field(id, EntryField::Content, value)
    }

    pub fn set_handle(&mut self, id: EntryId, value: impl Into<String>) -> Result<()> {
        self.set_field(id, EntryField::Handle, value)
    }

    /// 设置字段并记录到历史
    pub fn set_field(&mut self, id: EntryId, field: EntryField, value: impl Into<String>) -> Result<()> {
        let history = &mut self.history;
        let file = self
            .files
            .iter_mut()
            .find(|file| file.contains(id))
            .ok_or(LocaleError::EntryNotFound(id.0))?;
        let entry = file
            .entries
            .entry_mut(id)
            .ok_or(LocaleError::EntryNotFound(id.0))?;

        if field == EntryField::Key && entry.is_locked() {
            return Err(LocaleError::Locked(id.0));
        }

        entry.set_field(field, value, Some(history));
        if entry.is_dirty() {
            file.changes_uncommitted = true;
        }
        Ok(())
    }

    /// 把条目重新绑定到另一个节点
    ///
    /// 作为一个历史操作记录；撤销恢复之前的字段值（写入当前绑定的节点）。
    pub fn rebind(
        &mut self,
        id: EntryId,
        node: &NodeRef,
        key_attribute: Option<&str>,
        translated_string: Option<&str>,
    ) -> Result<()> {
        let file = self
            .files
            .iter_mut()
            .find(|file| file.contains(id))
            .ok_or(LocaleError::EntryNotFound(id.0))?;
        let entry = file
            .entries
            .entry_mut(id)
            .ok_or(LocaleError::EntryNotFound(id.0))?;

        let action = entry.bind(node, key_attribute, translated_string)?;
        self.history.record(action);
        file.changes_uncommitted = true;
        Ok(())
    }

    /// 开始批量操作，之后的修改在 [`LocaleEditor::end_batch`] 时作为一个操作提交
    pub fn begin_batch(&mut self, label: impl Into<String>) {
        self.history.begin_batch(label);
    }

    pub fn end_batch(&mut self) -> bool {
        self.history.end_batch()
    }

    /// 撤销最后一个操作
    ///
    /// 操作的目标条目已不存在时返回错误，条目与历史都保持不变。
    ///
    /// # 返回
    /// 被撤销的操作
    pub fn undo(&mut self) -> Result<HistoryAction> {
        let action = self.history.peek_undo()?.clone();
        self.execute(&action, Direction::Undo)?;
        self.history.undo()?;
        Ok(action)
    }

    /// 重做上一次撤销的操作
    pub fn redo(&mut self) -> Result<HistoryAction> {
        let action = self.history.peek_redo()?.clone();
        self.execute(&action, Direction::Redo)?;
        self.history.redo()?;
        Ok(action)
    }

    fn execute(&mut self, action: &HistoryAction, direction: Direction) -> Result<()> {
        apply(action, direction, &mut self.files)?;

        for id in action.targets() {
            if let Some(file) = self.files.iter_mut().find(|file| file.contains(id)) {
                file.changes_uncommitted = true;
            }
        }
        Ok(())
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// 是否存在未保存的修改
    pub fn is_modified(&self) -> bool {
        self.files
            .iter()
            .any(|file| file.changes_uncommitted || file.has_dirty_entries())
    }

    /// 提交所有文件的修改标记（不写盘，不清除历史）
    pub fn commit_changes(&mut self) {
        for file in &mut self.files {
            file.commit_changes();
        }
    }

    /// 保存所有文件
    ///
    /// # 返回
    /// 保存成功的文件数量
    pub fn save_all(&mut self, writer: &dyn ResourceWriter) -> usize {
        save_data_files(writer, &mut self.files)
    }

    /// 备份所有存在于磁盘上的文件
    pub fn backup_all(&self, backup_dir: &Path) -> usize {
        backup_data_files(&self.files, backup_dir)
    }

    /// 生成编辑摘要
    pub fn summary(&self) -> String {
        format!(
            "文件数: {}, 修改状态: {}, {}",
            self.files.len(),
            if self.is_modified() {
                "已修改"
            } else {
                "未修改"
            },
            self.history.summary()
        )
    }
}
