/// 本地化条目模块
///
/// `LocaleEntry` 是一个可翻译单元（键 / 内容 / 句柄）的领域表示，
/// 与资源树中的节点属性双向同步：
///
/// - 读取方向：绑定（[`LocaleEntry::bind`]）时从节点读取字段值
/// - 写入方向：每次字段修改先更新缓存，再写回已绑定的属性
///
/// 字段修改可选地记录到 [`History`]，以支持撤销/重做。
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};
use serde::{Serialize, Deserialize};

use crate::datatypes::{AttributeValue, DataType, NodeAttribute};
use crate::editor::history::{Direction, History, HistoryAction};
use crate::handle::HANDLE_UNKNOWN;
use crate::resource::{NodeRef, WeakNodeRef};
use crate::utils::{LocaleError, Result};

static NEXT_ENTRY_ID: AtomicU64 = AtomicU64::new(1);

/// 条目标识符（进程内唯一）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntryId(pub u64);

impl EntryId {
    fn next() -> Self {
        Self(NEXT_ENTRY_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 可同步的字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryField {
    Key,
    Content,
    Handle,
}

impl EntryField {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryField::Key => "Key",
            EntryField::Content => "Content",
            EntryField::Handle => "Handle",
        }
    }
}

impl fmt::Display for EntryField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 三个同步字段的快照
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldValues {
    pub key: String,
    pub content: String,
    pub handle: String,
}

/// 键的来源
///
/// - `FreeIdentity`: 键来自节点上独立的标识属性，可编辑
/// - `StructuralIdentity`: 键由结构推导（嵌套编码），不可编辑
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provenance {
    #[default]
    FreeIdentity,
    StructuralIdentity,
}

/// 字段变化通知
pub trait FieldObserver {
    fn field_changed(&self, entry: EntryId, field: EntryField);
}

/// 指向节点上某个属性的非拥有引用
#[derive(Debug, Clone)]
struct AttributeSlot {
    node: WeakNodeRef,
    name: String,
}

impl AttributeSlot {
    fn new(node: &NodeRef, name: &str) -> Self {
        Self {
            node: Rc::downgrade(node),
            name: name.to_string(),
        }
    }

    fn read<T>(&self, f: impl FnOnce(&NodeAttribute) -> T) -> Option<T> {
        let node = self.node.upgrade()?;
        let node = node.borrow();
        node.attribute(&self.name).map(f)
    }

    fn write(&self, f: impl FnOnce(&mut NodeAttribute)) -> bool {
        let Some(node) = self.node.upgrade() else {
            return false;
        };
        let mut node = node.borrow_mut();
        match node.attribute_mut(&self.name) {
            Some(attribute) => {
                f(attribute);
                true
            }
            None => false,
        }
    }
}

/// 本地化条目
pub struct LocaleEntry {
    id: EntryId,
    key: String,
    content: String,
    handle: String,
    provenance: Provenance,
    selected: bool,
    dirty: bool,
    source_node: Option<WeakNodeRef>,
    key_attribute: Option<AttributeSlot>,
    translated_string: Option<AttributeSlot>,
    observers: Vec<Rc<dyn FieldObserver>>,
}

impl fmt::Debug for LocaleEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocaleEntry")
            .field("id", &self.id)
            .field("key", &self.key)
            .field("content", &self.content)
            .field("handle", &self.handle)
            .field("provenance", &self.provenance)
            .field("selected", &self.selected)
            .field("dirty", &self.dirty)
            .field("key_attribute", &self.key_attribute_name())
            .field("translated_string", &self.translated_string_name())
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Default for LocaleEntry {
    fn default() -> Self {
        Self::new(Provenance::FreeIdentity)
    }
}

impl LocaleEntry {
    /// 创建未绑定的条目
    pub fn new(provenance: Provenance) -> Self {
        Self {
            id: EntryId::next(),
            key: String::new(),
            content: String::new(),
            handle: HANDLE_UNKNOWN.to_string(),
            provenance,
            selected: false,
            dirty: false,
            source_node: None,
            key_attribute: None,
            translated_string: None,
            observers: Vec::new(),
        }
    }

    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn handle(&self) -> &str {
        &self.handle
    }

    pub fn provenance(&self) -> Provenance {
        self.provenance
    }

    /// 键是否由结构推导（不可编辑）
    pub fn is_locked(&self) -> bool {
        self.provenance == Provenance::StructuralIdentity
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    /// 自上次提交以来是否有字段被修改
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn commit_changes(&mut self) {
        self.dirty = false;
    }

    pub fn values(&self) -> FieldValues {
        FieldValues {
            key: self.key.clone(),
            content: self.content.clone(),
            handle: self.handle.clone(),
        }
    }

    pub fn field(&self, field: EntryField) -> &str {
        match field {
            EntryField::Key => &self.key,
            EntryField::Content => &self.content,
            EntryField::Handle => &self.handle,
        }
    }

    /// 绑定的源节点（树已释放时为 None）
    pub fn source_node(&self) -> Option<NodeRef> {
        self.source_node.as_ref().and_then(Weak::upgrade)
    }

    pub fn key_attribute_name(&self) -> Option<&str> {
        self.key_attribute.as_ref().map(|slot| slot.name.as_str())
    }

    pub fn translated_string_name(&self) -> Option<&str> {
        self.translated_string.as_ref().map(|slot| slot.name.as_str())
    }

    /// 注册字段变化观察者
    pub fn subscribe(&mut self, observer: Rc<dyn FieldObserver>) {
        self.observers.push(observer);
    }

    pub fn set_key(&mut self, value: impl Into<String>, history: Option<&mut History>) {
        self.set_field(EntryField::Key, value, history);
    }

    pub fn set_content(&mut self, value: impl Into<String>, history: Option<&mut History>) {
        self.set_field(EntryField::Content, value, history);
    }

    pub fn set_handle(&mut self, value: impl Into<String>, history: Option<&mut History>) {
        self.set_field(EntryField::Handle, value, history);
    }

    /// 设置字段
    ///
    /// # 参数
    /// * `field` - 要修改的字段
    /// * `value` - 新值
    /// * `history` - 为 `Some` 时记录撤销/重做操作
    ///
    /// # 行为
    /// - 已绑定属性的当前值等于新值：视为提交已应用的值，只同步缓存，不记录历史
    /// - 否则更新缓存、写回已绑定属性并通知观察者；未绑定时只更新缓存，
    ///   但仍然记录历史
    pub fn set_field(&mut self, field: EntryField, value: impl Into<String>, history: Option<&mut History>) {
        let value = value.into();

        if self.backing_value(field).as_deref() == Some(value.as_str()) {
            if self.store(field, value) {
                self.dirty = true;
                self.notify(field);
            }
            return;
        }

        if self.field(field) == value && !self.is_bound(field) {
            return;
        }

        if let Some(history) = history {
            history.record(HistoryAction::FieldChange {
                target: self.id,
                field,
                old: self.field(field).to_string(),
                new: value.clone(),
            });
        }

        self.assign(field, value);
    }

    /// 绑定到节点
    ///
    /// # 参数
    /// * `node` - 源节点
    /// * `key_attribute` - 键属性名（None 表示无标识属性）
    /// * `translated_string` - 可翻译字符串属性名
    ///
    /// # 返回
    /// 可撤销的重新绑定操作：撤销恢复之前的字段值，而不是之前的绑定。
    /// 是否记录到历史由调用方决定（初次加载时不记录）。
    ///
    /// # 错误
    /// - 节点缺少指定的键属性
    /// - 指定的属性不是可翻译字符串
    ///
    /// 失败时条目保持不变。
    pub fn bind(
        &mut self,
        node: &NodeRef,
        key_attribute: Option<&str>,
        translated_string: Option<&str>,
    ) -> Result<HistoryAction> {
        let old = self.values();

        let new = {
            let inner = node.borrow();

            let key = match key_attribute {
                Some(name) => inner
                    .attribute(name)
                    .ok_or_else(|| {
                        LocaleError::Binding(format!("node '{}' has no attribute '{}'", inner.name, name))
                    })?
                    .as_str()
                    .unwrap_or_default()
                    .to_string(),
                None => String::new(),
            };

            let (content, handle) = match translated_string {
                Some(name) => {
                    let ts = inner
                        .attribute(name)
                        .and_then(NodeAttribute::as_translated_string)
                        .ok_or_else(|| {
                            LocaleError::Binding(format!(
                                "attribute '{}' of node '{}' is not a translated string",
                                name, inner.name
                            ))
                        })?;
                    (ts.value.clone(), ts.handle.clone())
                }
                None => (String::new(), String::new()),
            };

            FieldValues { key, content, handle }
        };

        self.source_node = Some(Rc::downgrade(node));
        self.key_attribute = key_attribute.map(|name| AttributeSlot::new(node, name));
        self.translated_string = translated_string.map(|name| AttributeSlot::new(node, name));

        for (field, value) in [
            (EntryField::Key, new.key.clone()),
            (EntryField::Content, new.content.clone()),
            (EntryField::Handle, new.handle.clone()),
        ] {
            if self.store(field, value) {
                self.notify(field);
            }
        }

        Ok(HistoryAction::Rebind {
            target: self.id,
            old,
            new,
        })
    }

    /// 执行单个历史操作（批量操作由 `history::apply` 展开）
    pub(crate) fn apply_change(&mut self, action: &HistoryAction, direction: Direction) {
        match action {
            HistoryAction::FieldChange { field, old, new, .. } => {
                let value = match direction {
                    Direction::Undo => old,
                    Direction::Redo => new,
                };
                self.assign(*field, value.clone());
            }
            HistoryAction::Rebind { old, new, .. } => {
                let values = match direction {
                    Direction::Undo => old,
                    Direction::Redo => new,
                };
                self.assign(EntryField::Key, values.key.clone());
                self.assign(EntryField::Content, values.content.clone());
                self.assign(EntryField::Handle, values.handle.clone());
            }
            HistoryAction::Batch { .. } => {}
        }
    }

    /// 字段是否有可用的绑定属性
    pub fn is_bound(&self, field: EntryField) -> bool {
        self.backing_value(field).is_some()
    }

    /// 绑定属性的当前值
    fn backing_value(&self, field: EntryField) -> Option<String> {
        match field {
            EntryField::Key => self
                .key_attribute
                .as_ref()?
                .read(|attribute| attribute.as_str().unwrap_or_default().to_string()),
            EntryField::Content => self
                .translated_string
                .as_ref()?
                .read(|attribute| attribute.as_translated_string().map(|ts| ts.value.clone()))
                .flatten(),
            EntryField::Handle => self
                .translated_string
                .as_ref()?
                .read(|attribute| attribute.as_translated_string().map(|ts| ts.handle.clone()))
                .flatten(),
        }
    }

    /// 更新缓存、写回绑定属性、标记修改并通知
    fn assign(&mut self, field: EntryField, value: String) {
        self.store(field, value);
        self.propagate(field);
        self.dirty = true;
        self.notify(field);
    }

    /// 只更新缓存，返回值是否发生变化
    fn store(&mut self, field: EntryField, value: String) -> bool {
        let slot = match field {
            EntryField::Key => &mut self.key,
            EntryField::Content => &mut self.content,
            EntryField::Handle => &mut self.handle,
        };
        if *slot == value {
            return false;
        }
        *slot = value;
        true
    }

    fn propagate(&self, field: EntryField) {
        match field {
            EntryField::Key => {
                if let Some(slot) = &self.key_attribute {
                    let key = self.key.clone();
                    slot.write(|attribute| {
                        if !matches!(attribute.data_type, DataType::FixedString | DataType::LongString) {
                            attribute.data_type = DataType::FixedString;
                        }
                        attribute.value = AttributeValue::String(key);
                    });
                }
            }
            EntryField::Content | EntryField::Handle => {
                if let Some(slot) = &self.translated_string {
                    slot.write(|attribute| {
                        if let Some(ts) = attribute.as_translated_string_mut() {
                            match field {
                                EntryField::Content => ts.value = self.content.clone(),
                                _ => ts.handle = self.handle.clone(),
                            }
                        }
                    });
                }
            }
        }
    }

    fn notify(&self, field: EntryField) {
        for observer in &self.observers {
            observer.field_changed(self.id, field);
        }
    }
}
