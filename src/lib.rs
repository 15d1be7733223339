pub mod datatypes;
pub mod handle;
pub mod config;
pub mod resource;
pub mod entry;
pub mod editor;
pub mod reconcile;
pub mod locale_file;
pub mod io;
pub mod export;
pub mod import;
pub mod storage;
pub mod utils;

// 重新导出主要结构
pub use config::LocaleConventions;
pub use editor::{History, HistoryAction, LocaleEditor};
pub use entry::{EntryField, EntryId, FieldObserver, LocaleEntry, Provenance};
pub use export::ExportFlags;
pub use handle::{create_handle, HANDLE_UNKNOWN};
pub use locale_file::{LocaleFile, LocaleFileStats};
pub use reconcile::{load_from_node, load_from_resource, Encoding, ResourceFormat};
pub use resource::{Node, NodeRef, Resource};
pub use utils::{LocaleError, Result};

// 常量定义
pub const SUPPORTED_EXTENSIONS: &[&str] = &["lsb", "lsj", "lsx"];
