/// 资源编码约定
///
/// 平铺编码（`.lsb` 字符串表）按属性名约定查找键与内容；
/// 嵌套编码（`.lsj`/`.lsx` 对话树）没有可靠的键属性，使用固定的结构标签。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocaleConventions {
    /// 平铺编码中的键属性名
    pub key_attribute: &'static str,
    /// 平铺编码中的内容属性名
    pub content_attribute: &'static str,
    /// 嵌套编码条目的固定键
    pub structural_key: &'static str,
    /// 新条目的占位键
    pub new_key_placeholder: &'static str,
    /// 分隔文本导入的表头
    pub import_header: &'static str,
}

impl LocaleConventions {
    pub const DEFAULT: Self = Self::new();

    pub const fn new() -> Self {
        Self {
            key_attribute: "UUID",
            content_attribute: "Content",
            structural_key: "Dialog Node",
            new_key_placeholder: "NewKey",
            import_header: "Key\tContent",
        }
    }
}

impl Default for LocaleConventions {
    fn default() -> Self {
        Self::new()
    }
}
