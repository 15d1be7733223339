/// 资源 IO 默认实现
///
/// 以节点树的 JSON 表示读写资源（不区分格式标记），
/// 供没有接入原生编解码器时使用。
use std::path::Path;

use super::traits::{ResourceReader, ResourceWriter};
use crate::reconcile::ResourceFormat;
use crate::resource::Resource;
use crate::utils::Result;

/// 默认的资源读写器（基于 std::fs + serde_json）
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultResourceIo;

impl ResourceReader for DefaultResourceIo {
    fn read(&self, path: &Path, _format: ResourceFormat) -> Result<Resource> {
        let json = std::fs::read_to_string(path)?;
        Resource::from_json(&json)
    }
}

impl ResourceWriter for DefaultResourceIo {
    fn write(&self, resource: &Resource, path: &Path, _format: ResourceFormat) -> Result<()> {
        // 确保父目录存在
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, resource.to_json()?)?;
        Ok(())
    }
}
