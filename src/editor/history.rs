/// 编辑历史模块
///
/// 记录条目字段的每一次修改，支持撤销/重做。
/// 操作本身是可序列化的数据（而不是闭包），由 [`apply`] 按方向统一执行。
use serde::{Serialize, Deserialize};

use crate::entry::{EntryField, EntryId, FieldValues, LocaleEntry};
use crate::utils::{LocaleError, Result};

/// 单个可逆操作
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op")]
pub enum HistoryAction {
    /// 单字段修改
    FieldChange {
        target: EntryId,
        field: EntryField,
        old: String,
        new: String,
    },
    /// 重新绑定节点（仅恢复字段值，不恢复绑定）
    Rebind {
        target: EntryId,
        old: FieldValues,
        new: FieldValues,
    },
    /// 作为一个逻辑操作提交的多个操作
    Batch {
        label: String,
        actions: Vec<HistoryAction>,
    },
}

impl HistoryAction {
    /// 操作涉及的条目（批量操作按顺序展开）
    pub fn targets(&self) -> Vec<EntryId> {
        match self {
            HistoryAction::FieldChange { target, .. } | HistoryAction::Rebind { target, .. } => {
                vec![*target]
            }
            HistoryAction::Batch { actions, .. } => {
                actions.iter().flat_map(HistoryAction::targets).collect()
            }
        }
    }
}

/// 执行方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Undo,
    Redo,
}

/// 按条目 ID 查找条目
pub trait EntryLookup {
    fn entry_mut(&mut self, id: EntryId) -> Option<&mut LocaleEntry>;
}

impl EntryLookup for LocaleEntry {
    fn entry_mut(&mut self, id: EntryId) -> Option<&mut LocaleEntry> {
        if self.id() == id {
            Some(self)
        } else {
            None
        }
    }
}

impl EntryLookup for [LocaleEntry] {
    fn entry_mut(&mut self, id: EntryId) -> Option<&mut LocaleEntry> {
        self.iter_mut().find(|entry| entry.id() == id)
    }
}

impl EntryLookup for Vec<LocaleEntry> {
    fn entry_mut(&mut self, id: EntryId) -> Option<&mut LocaleEntry> {
        self.as_mut_slice().entry_mut(id)
    }
}

/// 按方向执行操作
///
/// 批量操作撤销时逆序执行。执行前检查所有目标条目，
/// 任一目标不存在时返回 `EntryNotFound`，且不修改任何条目。
pub fn apply<L>(action: &HistoryAction, direction: Direction, entries: &mut L) -> Result<()>
where
    L: EntryLookup + ?Sized,
{
    check_targets(action, entries)?;
    apply_unchecked(action, direction, entries)
}

/// 检查操作涉及的所有条目都存在
fn check_targets<L>(action: &HistoryAction, entries: &mut L) -> Result<()>
where
    L: EntryLookup + ?Sized,
{
    match action.targets().into_iter().find(|id| entries.entry_mut(*id).is_none()) {
        Some(missing) => Err(LocaleError::EntryNotFound(missing.0)),
        None => Ok(()),
    }
}

fn apply_unchecked<L>(action: &HistoryAction, direction: Direction, entries: &mut L) -> Result<()>
where
    L: EntryLookup + ?Sized,
{
    match action {
        HistoryAction::Batch { actions, .. } => match direction {
            Direction::Undo => actions
                .iter()
                .rev()
                .try_for_each(|action| apply_unchecked(action, direction, entries)),
            Direction::Redo => actions
                .iter()
                .try_for_each(|action| apply_unchecked(action, direction, entries)),
        },
        HistoryAction::FieldChange { target, .. } | HistoryAction::Rebind { target, .. } => {
            let entry = entries
                .entry_mut(*target)
                .ok_or(LocaleError::EntryNotFound(target.0))?;
            entry.apply_change(action, direction);
            Ok(())
        }
    }
}

/// 编辑历史
///
/// # 实现细节
/// - 使用两个栈实现撤销/重做：undo_stack 和 redo_stack
/// - 所有操作按时间顺序存储在 actions 向量中
/// - 栈中存储的是索引而非实际数据
/// - 记录新操作会清空重做栈（线性历史）
#[derive(Debug, Clone, Default)]
pub struct History {
    /// 所有操作的完整记录
    actions: Vec<HistoryAction>,
    /// 撤销栈（存储 actions 中的索引）
    undo_stack: Vec<usize>,
    /// 重做栈（存储 actions 中的索引）
    redo_stack: Vec<usize>,
    /// 正在收集的批量操作
    pending: Option<(String, Vec<HistoryAction>)>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一个操作
    ///
    /// 批量收集期间操作暂存，由 [`History::end_batch`] 统一提交。
    pub fn record(&mut self, action: HistoryAction) {
        if let Some((_, actions)) = self.pending.as_mut() {
            actions.push(action);
            return;
        }
        self.commit(action);
    }

    /// 开始收集批量操作
    ///
    /// 已在收集时，新的标签被忽略，操作并入外层批量。
    pub fn begin_batch(&mut self, label: impl Into<String>) {
        if self.pending.is_none() {
            self.pending = Some((label.into(), Vec::new()));
        }
    }

    /// 结束批量收集并作为一个逻辑操作提交
    ///
    /// # 返回
    /// 是否提交了操作（空批量不提交）
    pub fn end_batch(&mut self) -> bool {
        let Some((label, mut actions)) = self.pending.take() else {
            return false;
        };

        match actions.len() {
            0 => false,
            1 => {
                if let Some(action) = actions.pop() {
                    self.commit(action);
                }
                true
            }
            _ => {
                self.commit(HistoryAction::Batch { label, actions });
                true
            }
        }
    }

    fn commit(&mut self, action: HistoryAction) {
        let index = self.actions.len();
        self.actions.push(action);
        self.undo_stack.push(index);
        self.redo_stack.clear();
    }

    /// 下一个要撤销的操作（不移动栈）
    pub fn peek_undo(&self) -> Result<&HistoryAction> {
        self.undo_stack
            .last()
            .and_then(|&index| self.actions.get(index))
            .ok_or(LocaleError::NothingToUndo)
    }

    /// 下一个要重做的操作（不移动栈）
    pub fn peek_redo(&self) -> Result<&HistoryAction> {
        self.redo_stack
            .last()
            .and_then(|&index| self.actions.get(index))
            .ok_or(LocaleError::NothingToRedo)
    }

    /// 弹出最后一次操作用于撤销
    pub fn undo(&mut self) -> Result<&HistoryAction> {
        let index = self.undo_stack.pop().ok_or(LocaleError::NothingToUndo)?;
        self.redo_stack.push(index);
        self.actions.get(index).ok_or(LocaleError::NothingToUndo)
    }

    /// 弹出最后一次撤销的操作用于重做
    pub fn redo(&mut self) -> Result<&HistoryAction> {
        let index = self.redo_stack.pop().ok_or(LocaleError::NothingToRedo)?;
        self.undo_stack.push(index);
        self.actions.get(index).ok_or(LocaleError::NothingToRedo)
    }

    /// 当前有效操作数量（撤销栈大小）
    pub fn len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.undo_stack.is_empty()
    }

    /// 按应用顺序遍历当前有效的操作
    pub fn iter(&self) -> impl Iterator<Item = &HistoryAction> {
        self.undo_stack.iter().filter_map(|&idx| self.actions.get(idx))
    }

    /// 所有操作（包括已撤销的）
    pub fn all_actions(&self) -> &[HistoryAction] {
        &self.actions
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn clear(&mut self) {
        self.actions.clear();
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.pending = None;
    }

    /// 获取涉及特定条目的所有有效操作
    pub fn actions_for_entry(&self, id: EntryId) -> Vec<&HistoryAction> {
        self.iter()
            .filter(|action| action.targets().contains(&id))
            .collect()
    }

    /// 生成历史摘要
    pub fn summary(&self) -> String {
        format!(
            "操作总数: {}, 有效操作: {}, 可撤销: {}, 可重做: {}",
            self.actions.len(),
            self.undo_stack.len(),
            self.can_undo(),
            self.can_redo()
        )
    }
}

fn truncate(text: &str) -> String {
    if text.chars().count() > 30 {
        format!("{}...", text.chars().take(30).collect::<String>())
    } else {
        text.to_string()
    }
}

impl std::fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HistoryAction::FieldChange { target, field, old, new } => write!(
                f,
                "[{}] {}: \"{}\" -> \"{}\"",
                target,
                field,
                truncate(old),
                truncate(new)
            ),
            HistoryAction::Rebind { target, old, new } => write!(
                f,
                "[{}] rebind: \"{}\" -> \"{}\"",
                target,
                truncate(&old.key),
                truncate(&new.key)
            ),
            HistoryAction::Batch { label, actions } => {
                write!(f, "{} ({} 个操作)", label, actions.len())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_change(target: u64, old: &str, new: &str) -> HistoryAction {
        HistoryAction::FieldChange {
            target: EntryId(target),
            field: EntryField::Content,
            old: old.to_string(),
            new: new.to_string(),
        }
    }

    #[test]
    fn test_history_basic() {
        let mut history = History::new();
        assert_eq!(history.len(), 0);
        assert!(history.is_empty());

        history.record(create_test_change(1, "old", "new"));
        assert_eq!(history.len(), 1);
        assert!(!history.is_empty());
    }

    #[test]
    fn test_undo_redo() {
        let mut history = History::new();

        history.record(create_test_change(1, "a", "b"));
        history.record(create_test_change(2, "c", "d"));
        history.record(create_test_change(3, "e", "f"));

        let undone = history.undo().unwrap();
        assert_eq!(undone.targets(), vec![EntryId(3)]);
        assert_eq!(history.len(), 2);

        history.undo().unwrap();
        assert_eq!(history.len(), 1);

        let redone = history.redo().unwrap();
        assert_eq!(redone.targets(), vec![EntryId(2)]);
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_new_action_clears_redo() {
        let mut history = History::new();

        history.record(create_test_change(1, "a", "b"));
        history.record(create_test_change(2, "c", "d"));

        history.undo().unwrap();
        assert!(history.can_redo());

        history.record(create_test_change(3, "e", "f"));
        assert!(!history.can_redo());
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_undo_redo_when_empty() {
        let mut history = History::new();
        assert!(matches!(history.undo(), Err(LocaleError::NothingToUndo)));
        assert!(matches!(history.redo(), Err(LocaleError::NothingToRedo)));
    }

    #[test]
    fn test_batch_commits_single_action() {
        let mut history = History::new();

        history.begin_batch("import");
        history.record(create_test_change(1, "a", "b"));
        history.record(create_test_change(2, "c", "d"));
        assert!(history.is_empty());
        assert!(history.end_batch());

        assert_eq!(history.len(), 1);
        let action = history.undo().unwrap();
        assert_eq!(action.targets(), vec![EntryId(1), EntryId(2)]);
    }

    #[test]
    fn test_batch_edge_cases() {
        let mut history = History::new();

        history.begin_batch("empty");
        assert!(!history.end_batch());
        assert!(history.is_empty());

        history.begin_batch("single");
        history.record(create_test_change(1, "a", "b"));
        history.end_batch();
        assert!(matches!(
            history.all_actions()[0],
            HistoryAction::FieldChange { .. }
        ));

        assert!(!history.end_batch());
    }

    #[test]
    fn test_apply_batch_undo_order() {
        let mut entries = vec![LocaleEntry::default()];
        let id = entries[0].id();
        let batch = HistoryAction::Batch {
            label: "two edits".to_string(),
            actions: vec![
                HistoryAction::FieldChange {
                    target: id,
                    field: EntryField::Content,
                    old: String::new(),
                    new: "first".to_string(),
                },
                HistoryAction::FieldChange {
                    target: id,
                    field: EntryField::Content,
                    old: "first".to_string(),
                    new: "second".to_string(),
                },
            ],
        };

        apply(&batch, Direction::Redo, &mut entries).unwrap();
        assert_eq!(entries[0].content(), "second");

        apply(&batch, Direction::Undo, &mut entries).unwrap();
        assert_eq!(entries[0].content(), "");
    }

    #[test]
    fn test_apply_missing_target() {
        let mut entries: Vec<LocaleEntry> = Vec::new();
        let result = apply(&create_test_change(42, "a", "b"), Direction::Undo, &mut entries);
        assert!(matches!(result, Err(LocaleError::EntryNotFound(42))));
    }

    #[test]
    fn test_apply_batch_with_missing_target_changes_nothing() {
        let mut entries = vec![LocaleEntry::default()];
        let id = entries[0].id();
        entries[0].set_content("kept", None);

        let batch = HistoryAction::Batch {
            label: "two edits".to_string(),
            actions: vec![
                create_test_change(id.0, "", "kept"),
                create_test_change(u64::MAX, "a", "b"),
            ],
        };

        let result = apply(&batch, Direction::Undo, &mut entries);
        assert!(matches!(result, Err(LocaleError::EntryNotFound(u64::MAX))));
        assert_eq!(entries[0].content(), "kept");
    }

    #[test]
    fn test_peek_does_not_move_stacks() {
        let mut history = History::new();
        assert!(matches!(history.peek_undo(), Err(LocaleError::NothingToUndo)));
        assert!(matches!(history.peek_redo(), Err(LocaleError::NothingToRedo)));

        history.record(create_test_change(1, "a", "b"));
        assert!(matches!(
            history.peek_undo().unwrap(),
            HistoryAction::FieldChange { target: EntryId(1), .. }
        ));
        assert!(history.can_undo());
        assert!(!history.can_redo());

        history.undo().unwrap();
        assert!(history.peek_redo().is_ok());
        assert!(history.can_redo());
        assert!(!history.can_undo());
    }

    #[test]
    fn test_actions_for_entry_and_summary() {
        let mut history = History::new();
        history.record(create_test_change(100, "old1", "new1"));
        history.record(create_test_change(200, "x", "y"));
        history.record(create_test_change(100, "old2", "new2"));

        assert_eq!(history.actions_for_entry(EntryId(100)).len(), 2);

        let summary = history.summary();
        assert!(summary.contains("操作总数: 3"));
        assert!(summary.contains("有效操作: 3"));
    }

    #[test]
    fn test_action_serializes_with_tag() {
        let json = serde_json::to_value(create_test_change(7, "a", "b")).unwrap();
        assert_eq!(json["op"], "FieldChange");
        assert_eq!(json["target"], 7);
        assert_eq!(json["field"], "Content");
    }
}
