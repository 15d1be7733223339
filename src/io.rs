/// IO 抽象层模块
///
/// 资源格式的解析与序列化由外部编解码器负责，本模块只定义读写接口，
/// 支持依赖注入、测试 mock 和替换 IO 实现。
///
/// # 架构设计
///
/// - **traits**: 定义 Reader/Writer trait 接口
/// - **resource_io**: 基于节点树 JSON 表示的默认实现
///
/// # 使用示例
///
/// ```rust,ignore
/// use divinity_locale::io::{DefaultResourceIo, ResourceReader};
///
/// let io = DefaultResourceIo;
/// let resource = io.read(Path::new("English.lsb"), ResourceFormat::Lsb)?;
/// ```
pub mod traits;
pub mod resource_io;

// === 导出 trait 定义 ===
pub use traits::{ResourceReader, ResourceWriter};

// === 导出默认实现 ===
pub use resource_io::DefaultResourceIo;
