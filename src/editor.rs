/// 编辑器层模块
///
/// 该模块提供有状态的编辑接口，支持变更追踪、撤销/重做。
/// 遵循"修改-保存分离"原则，所有修改操作仅在内存中进行，需要显式调用保存。
///
/// # 架构设计
///
/// - **history**: 可序列化的历史操作与撤销/重做栈
/// - **session**: 编辑会话，管理一组文件的修改状态
///
/// # 使用示例
///
/// ```rust,ignore
/// use divinity_locale::{storage, LocaleEditor};
/// use divinity_locale::io::DefaultResourceIo;
///
/// // 加载 + 编辑 + 保存工作流
/// let file = storage::load_resource(Path::new("English.lsb"))?;
/// let id = file.entries[0].id();
/// let mut editor = LocaleEditor::new(vec![file]);
///
/// editor.set_content(id, "Hello")?;
/// println!("{}", editor.summary());
///
/// editor.save_all(&DefaultResourceIo);
/// ```
pub mod history;
pub mod session;

// === 导出公共接口 ===
pub use history::{apply, Direction, EntryLookup, History, HistoryAction};
pub use session::LocaleEditor;
