//! 嵌套资源（.lsj/.lsx）集成测试
//!
//! 对话资源中的可翻译字符串分布在任意深度的节点上，
//! 条目的键由结构决定（锁定），只能编辑内容与句柄。

use std::path::Path;
use tempfile::TempDir;

use divinity_locale::export::{export_data_as_xml, ExportFlags};
use divinity_locale::io::DefaultResourceIo;
use divinity_locale::storage::{load_resource, load_resource_with, save_data_file};
use divinity_locale::{LocaleEditor, LocaleError, Provenance};

const DIALOG_JSON: &str = r#"{
  "regions": [
    {
      "id": "dialog",
      "node": {
        "id": "root",
        "children": [
          {
            "name": "nodes",
            "nodes": [
              {
                "id": "node",
                "attributes": {
                  "UUID": { "type": 22, "value": "a1b2" }
                },
                "children": [
                  {
                    "name": "TaggedTexts",
                    "nodes": [
                      {
                        "id": "TaggedText",
                        "attributes": {
                          "TagText": { "type": 28, "value": { "handle": "h_first", "value": "Who goes there?" } }
                        }
                      }
                    ]
                  }
                ]
              },
              {
                "id": "node",
                "attributes": {
                  "Line": { "type": 28, "value": { "handle": "h_second", "value": "Only a <friend>." } }
                }
              }
            ]
          }
        ]
      }
    }
  ]
}"#;

fn write_dialog(dir: &Path, name: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, DIALOG_JSON).unwrap();
    path
}

#[test]
fn test_nested_discovery_in_traversal_order() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_dialog(temp_dir.path(), "Dialog.lsj");

    let file = load_resource_with(&DefaultResourceIo, &path, false).unwrap();
    assert_eq!(file.len(), 2);
    assert_eq!(file.entries[0].content(), "Who goes there?");
    assert_eq!(file.entries[1].content(), "Only a <friend>.");

    for entry in &file.entries {
        assert_eq!(entry.key(), "Dialog Node");
        assert_eq!(entry.provenance(), Provenance::StructuralIdentity);
        assert!(entry.is_locked());
        assert!(!entry.is_dirty());
    }

    println!("✓ 嵌套条目发现通过: {}", file.get_stats().entry_count);
}

#[test]
fn test_nested_edit_and_save() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_dialog(temp_dir.path(), "Dialog.lsx");

    let file = load_resource(&path).unwrap();
    let id = file.entries[0].id();
    let mut editor = LocaleEditor::new(vec![file]);

    assert!(matches!(editor.set_key(id, "Renamed"), Err(LocaleError::Locked(_))));
    editor.set_content(id, "Halt!").unwrap();
    editor.set_handle(id, "h_custom").unwrap();
    assert_eq!(editor.save_all(&DefaultResourceIo), 1);

    let reloaded = load_resource(&path).unwrap();
    let edited = reloaded.entries.iter().find(|e| e.handle() == "h_custom").unwrap();
    assert_eq!(edited.content(), "Halt!");
    assert_eq!(reloaded.len(), 2);
}

#[test]
fn test_nested_export_omits_key() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_dialog(temp_dir.path(), "Dialog.lsj");

    let mut file = load_resource_with(&DefaultResourceIo, &path, false).unwrap();
    file.set_all_selected(true);

    let output = export_data_as_xml(&file, ExportFlags::all());
    assert_eq!(
        output,
        "\t<content contentuid=\"h_first\" Source=\"Dialog.lsj\">Who goes there?</content>\n\
         \t<content contentuid=\"h_second\" Source=\"Dialog.lsj\">Only a &lt;friend&gt;.</content>\n"
    );
}

#[test]
fn test_nested_remove_keeps_tree() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_dialog(temp_dir.path(), "Dialog.lsj");

    let mut file = load_resource_with(&DefaultResourceIo, &path, false).unwrap();
    let id = file.entries[0].id();
    assert!(file.remove(id).is_some());
    assert_eq!(save_data_file(&DefaultResourceIo, &file), 1);

    // 嵌套节点仍在树中，重新加载后条目恢复
    let reloaded = load_resource(&path).unwrap();
    assert_eq!(reloaded.len(), 2);
}
