use super::LocaleFile;

/// 本地化文件统计信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleFileStats {
    pub name: String,
    pub format: String,
    pub entry_count: usize,
    pub locked_count: usize,
    pub selected_count: usize,
    pub dirty_count: usize,
    pub empty_content_count: usize,
    pub changes_uncommitted: bool,
}

impl LocaleFileStats {
    pub(super) fn collect(file: &LocaleFile) -> Self {
        let count = |predicate: fn(&crate::LocaleEntry) -> bool| {
            file.entries.iter().filter(|entry| predicate(entry)).count()
        };

        Self {
            name: file.name.clone(),
            format: file.format.to_extension().to_uppercase(),
            entry_count: file.entries.len(),
            locked_count: count(|entry| entry.is_locked()),
            selected_count: count(|entry| entry.is_selected()),
            dirty_count: count(|entry| entry.is_dirty()),
            empty_content_count: count(|entry| entry.content().trim().is_empty()),
            changes_uncommitted: file.changes_uncommitted,
        }
    }
}

impl std::fmt::Display for LocaleFileStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== 本地化文件统计信息 ===")?;
        writeln!(f, "名称: {}", self.name)?;
        writeln!(f, "格式: {}", self.format)?;
        writeln!(f, "条目数量: {}", self.entry_count)?;
        writeln!(f, "锁定条目: {}", self.locked_count)?;
        writeln!(f, "已选中: {}", self.selected_count)?;
        writeln!(f, "已修改: {}", self.dirty_count)?;
        writeln!(f, "空内容: {}", self.empty_content_count)?;
        writeln!(f, "未保存: {}", if self.changes_uncommitted { "是" } else { "否" })?;
        Ok(())
    }
}
