/// IO 抽象层 - trait 定义
///
/// 遵循依赖倒置原则（DIP），协调器与编辑器只面向这些接口编程。
use std::path::Path;

use crate::reconcile::ResourceFormat;
use crate::resource::Resource;
use crate::utils::Result;

/// 资源读取 trait
///
/// # 职责
/// - 从文件系统读取资源文件并解析为节点树
/// - `format` 由调用方根据扩展名或显式选择给出
///
/// # 实现示例
/// ```rust,ignore
/// pub struct MemoryReader(String);
/// impl ResourceReader for MemoryReader {
///     fn read(&self, _path: &Path, _format: ResourceFormat) -> Result<Resource> {
///         Resource::from_json(&self.0)
///     }
/// }
/// ```
pub trait ResourceReader {
    /// 读取资源
    ///
    /// # 参数
    /// * `path` - 文件路径
    /// * `format` - 资源格式
    fn read(&self, path: &Path, format: ResourceFormat) -> Result<Resource>;
}

/// 资源写入 trait
///
/// # 职责
/// - 将（已被条目修改过的）节点树序列化并写回文件系统
pub trait ResourceWriter {
    /// 写入资源
    ///
    /// # 参数
    /// * `resource` - 要写入的资源
    /// * `path` - 目标文件路径
    /// * `format` - 资源格式
    fn write(&self, resource: &Resource, path: &Path, format: ResourceFormat) -> Result<()>;
}
