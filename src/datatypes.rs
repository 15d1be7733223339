use serde::{Serialize, Deserialize};

use crate::handle::HANDLE_UNKNOWN;

/// 属性数据类型
///
/// 数值与资源格式中的类型编号一致，未识别的编号原样保留。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub enum DataType {
    /// 空值
    None,
    /// 32位整数
    Int,
    /// 布尔值
    Bool,
    /// 定长字符串
    FixedString,
    /// 长字符串
    LongString,
    /// 可翻译字符串（句柄 + 文本）
    TranslatedString,
    /// 未知类型
    Unknown(u32),
}

impl DataType {
    /// 转换为u32值
    pub fn to_u32(&self) -> u32 {
        match self {
            DataType::None => 0,
            DataType::Int => 4,
            DataType::Bool => 19,
            DataType::FixedString => 22,
            DataType::LongString => 23,
            DataType::TranslatedString => 28,
            DataType::Unknown(value) => *value,
        }
    }
}

impl From<u32> for DataType {
    fn from(value: u32) -> Self {
        match value {
            0 => DataType::None,
            4 => DataType::Int,
            19 => DataType::Bool,
            22 => DataType::FixedString,
            23 => DataType::LongString,
            28 => DataType::TranslatedString,
            _ => DataType::Unknown(value),
        }
    }
}

impl From<DataType> for u32 {
    fn from(value: DataType) -> Self {
        value.to_u32()
    }
}

/// 可翻译字符串
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslatedString {
    /// 稳定句柄
    pub handle: String,
    /// 当前文本
    pub value: String,
}

impl TranslatedString {
    pub fn new(handle: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            value: value.into(),
        }
    }
}

impl Default for TranslatedString {
    fn default() -> Self {
        Self::new(HANDLE_UNKNOWN, "")
    }
}

/// 属性值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    TranslatedString(TranslatedString),
    Bool(bool),
    Int(i64),
    String(String),
    None,
}

/// 节点属性
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeAttribute {
    #[serde(rename = "type")]
    pub data_type: DataType,
    pub value: AttributeValue,
}

impl NodeAttribute {
    /// 按数据类型创建带默认值的属性
    pub fn new(data_type: DataType) -> Self {
        let value = match data_type {
            DataType::TranslatedString => AttributeValue::TranslatedString(TranslatedString::default()),
            DataType::Bool => AttributeValue::Bool(false),
            DataType::Int => AttributeValue::Int(0),
            DataType::FixedString | DataType::LongString => AttributeValue::String(String::new()),
            DataType::None | DataType::Unknown(_) => AttributeValue::None,
        };
        Self { data_type, value }
    }

    /// 创建定长字符串属性
    pub fn fixed_string(value: impl Into<String>) -> Self {
        Self {
            data_type: DataType::FixedString,
            value: AttributeValue::String(value.into()),
        }
    }

    /// 创建可翻译字符串属性
    pub fn translated_string(handle: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            data_type: DataType::TranslatedString,
            value: AttributeValue::TranslatedString(TranslatedString::new(handle, value)),
        }
    }

    pub fn is_translated_string(&self) -> bool {
        matches!(self.value, AttributeValue::TranslatedString(_))
    }

    pub fn as_translated_string(&self) -> Option<&TranslatedString> {
        match &self.value {
            AttributeValue::TranslatedString(ts) => Some(ts),
            _ => None,
        }
    }

    pub fn as_translated_string_mut(&mut self) -> Option<&mut TranslatedString> {
        match &mut self.value {
            AttributeValue::TranslatedString(ts) => Some(ts),
            _ => None,
        }
    }

    /// 字符串值（非字符串类型返回 None）
    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }
}

// 支持的编码（windows-1252 可解码任意字节，放在最后）
const SUPPORTED_ENCODINGS: &[&str] = &["utf-8", "windows-1252"];

/// 解码文本文件内容
///
/// 先按 UTF-8 解码，失败时按 windows-1252 解码。UTF-8 BOM 会被去除。
pub fn decode_text(data: &[u8]) -> String {
    let data = data.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(data);

    for encoding_name in SUPPORTED_ENCODINGS {
        if let Some(encoding) = encoding_rs::Encoding::for_label(encoding_name.as_bytes()) {
            let (decoded, had_errors) = encoding.decode_without_bom_handling(data);
            if !had_errors {
                return decoded.into_owned();
            }
        }
    }

    String::from_utf8_lossy(data).into_owned()
}
