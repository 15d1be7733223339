/// 句柄工具
///
/// 句柄是去掉连字符（以 `g` 代替）并以 `h` 开头的 UUID 文本，
/// 用于在文本变化时仍能稳定地标识一个可翻译字符串。
use uuid::Uuid;

/// 未绑定可翻译字符串时的句柄哨兵值
pub const HANDLE_UNKNOWN: &str = "ls::TranslatedStringRepository::s_HandleUnknown";

/// 生成新的句柄
///
/// # 返回
/// 形如 `h1b4e28bag2fa1g11d2g883fg0016d3cca427` 的字符串
pub fn create_handle() -> String {
    let mut handle = String::with_capacity(37);
    handle.push('h');
    handle.extend(
        Uuid::new_v4()
            .hyphenated()
            .to_string()
            .chars()
            .map(|c| if c == '-' { 'g' } else { c }),
    );
    handle
}

/// 检查字符串是否符合生成句柄的格式
pub fn is_generated_handle(handle: &str) -> bool {
    let Some(body) = handle.strip_prefix('h') else {
        return false;
    };

    body.len() == 36
        && body.char_indices().all(|(i, c)| match i {
            8 | 13 | 18 | 23 => c == 'g',
            _ => c.is_ascii_digit() || ('a'..='f').contains(&c),
        })
}
