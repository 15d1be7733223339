/// 文本导出模块
///
/// 将选中的条目导出为 `<content>` 标记行，可直接粘贴进语言包的 XML 文件。
use crate::entry::LocaleEntry;
use crate::locale_file::LocaleFile;

bitflags::bitflags! {
    /// 导出选项
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ExportFlags: u8 {
        /// 输出 Source 属性（来源文件名）
        const SOURCE_NAME = 0b01;
        /// 输出 Key 属性（仅对未锁定且非空的键）
        const KEY_NAME = 0b10;
    }
}

impl Default for ExportFlags {
    fn default() -> Self {
        ExportFlags::all()
    }
}

/// 转义 XML 特殊字符
///
/// 先替换 `&`，避免后续插入的实体被二次转义。
pub fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('\'', "&apos;")
        .replace('"', "&quot;")
        .replace('>', "&gt;")
        .replace('<', "&lt;")
}

/// 导出单个条目为一行
pub fn export_entry(entry: &LocaleEntry, source_name: Option<&str>, flags: ExportFlags) -> String {
    let source = match source_name {
        Some(name) if flags.contains(ExportFlags::SOURCE_NAME) => format!(" Source=\"{}\"", escape_xml(name)),
        _ => String::new(),
    };

    let key = if flags.contains(ExportFlags::KEY_NAME) && !entry.key().trim().is_empty() && !entry.is_locked() {
        format!(" Key=\"{}\"", escape_xml(entry.key()))
    } else {
        String::new()
    };

    format!(
        "\t<content contentuid=\"{}\"{}{}>{}</content>\n",
        entry.handle(),
        source,
        key,
        escape_xml(entry.content())
    )
}

/// 导出文件中所有选中的条目
///
/// # 返回
/// 按条目顺序拼接的多行文本（无外层 `contentList` 元素）
pub fn export_data_as_xml(file: &LocaleFile, flags: ExportFlags) -> String {
    let source_name = file
        .source
        .file_name()
        .map(|name| name.to_string_lossy().into_owned());

    file.selected()
        .into_iter()
        .map(|entry| export_entry(entry, source_name.as_deref(), flags))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use crate::entry::Provenance;
    use crate::reconcile::ResourceFormat;
    use crate::resource::Resource;

    fn entry(key: &str, content: &str, provenance: Provenance) -> LocaleEntry {
        let mut entry = LocaleEntry::new(provenance);
        entry.set_key(key, None);
        entry.set_content(content, None);
        entry.set_handle("h123", None);
        entry.set_selected(true);
        entry
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(
            escape_xml("He said \"hi\" & <left>"),
            "He said &quot;hi&quot; &amp; &lt;left&gt;"
        );
        assert_eq!(escape_xml("it's"), "it&apos;s");
        assert_eq!(escape_xml(""), "");
    }

    #[test]
    fn test_escape_xml_no_double_escape() {
        assert_eq!(escape_xml("&lt;"), "&amp;lt;");
        assert_eq!(escape_xml("a < b"), "a &lt; b");
    }

    #[test]
    fn test_export_entry_full() {
        let line = export_entry(&entry("Greeting", "Hi & bye", Provenance::FreeIdentity), Some("English.lsb"), ExportFlags::all());
        assert_eq!(
            line,
            "\t<content contentuid=\"h123\" Source=\"English.lsb\" Key=\"Greeting\">Hi &amp; bye</content>\n"
        );
    }

    #[test]
    fn test_export_entry_omits_locked_and_blank_keys() {
        let locked = export_entry(&entry("Dialog Node", "x", Provenance::StructuralIdentity), None, ExportFlags::all());
        assert_eq!(locked, "\t<content contentuid=\"h123\">x</content>\n");

        let blank = export_entry(&entry("  ", "x", Provenance::FreeIdentity), None, ExportFlags::KEY_NAME);
        assert!(!blank.contains("Key="));
    }

    #[test]
    fn test_export_entry_without_flags() {
        let line = export_entry(&entry("Greeting", "x", Provenance::FreeIdentity), Some("English.lsb"), ExportFlags::empty());
        assert_eq!(line, "\t<content contentuid=\"h123\">x</content>\n");
    }

    #[test]
    fn test_export_only_selected() {
        let mut file = LocaleFile::new(PathBuf::from("dir/English.lsb"), Resource::new(), ResourceFormat::Lsb);
        file.append(entry("a", "first", Provenance::FreeIdentity));
        let mut unselected = entry("b", "second", Provenance::FreeIdentity);
        unselected.set_selected(false);
        file.append(unselected);

        let output = export_data_as_xml(&file, ExportFlags::default());
        assert_eq!(output.lines().count(), 1);
        assert!(output.contains("Source=\"English.lsb\""));
        assert!(output.contains(">first<"));
    }
}
