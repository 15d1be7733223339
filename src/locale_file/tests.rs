use super::*;
use crate::datatypes::NodeAttribute;
use crate::reconcile::load_from_resource;

/// 创建测试用的平铺资源文件
fn create_test_file(keys: &[&str]) -> LocaleFile {
    let mut resource = Resource::new();
    let root = resource.add_region("TranslatedStringKeys", "root");
    for key in keys {
        let node = Node::new_ref("TranslatedStringKey");
        {
            let mut inner = node.borrow_mut();
            inner.set_attribute("UUID", NodeAttribute::fixed_string(*key));
            inner.set_attribute("Content", NodeAttribute::translated_string(format!("h_{}", key), *key));
        }
        Node::append_child(&root, "TranslatedStringKey", node);
    }

    let mut file = LocaleFile::new(PathBuf::from("Mods/Test/English.lsb"), resource, ResourceFormat::Lsb);
    assert!(load_from_resource(&mut file, false));
    file
}

fn keys(file: &LocaleFile) -> Vec<&str> {
    file.entries.iter().map(LocaleEntry::key).collect()
}

#[test]
fn test_name_from_source() {
    let file = create_test_file(&[]);
    assert_eq!(file.name, "English.lsb");
    assert!(file.is_empty());
    assert!(!file.changes_uncommitted);
}

#[test]
fn test_sort_by_key() {
    let mut file = create_test_file(&["b", "a", "c"]);
    file.sort_by_key();
    assert_eq!(keys(&file), vec!["a", "b", "c"]);

    file.sort_by_key();
    assert_eq!(keys(&file), vec!["a", "b", "c"]);
}

#[test]
fn test_sort_is_stable_and_ordinal() {
    let mut file = create_test_file(&["b", "B", "a", "b"]);
    let first_b = file.entries[0].id();
    let second_b = file.entries[3].id();

    file.sort_by_key();
    assert_eq!(keys(&file), vec!["B", "a", "b", "b"]);
    assert_eq!(file.entries[2].id(), first_b);
    assert_eq!(file.entries[3].id(), second_b);
}

#[test]
fn test_select_and_selected() {
    let mut file = create_test_file(&["a", "b", "c"]);
    file.entries[1].set_selected(true);

    let selected = file.selected();
    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0].key(), "b");

    let with_c = file.select(|entry| entry.content().contains('c'));
    assert_eq!(with_c.len(), 1);

    file.set_all_selected(true);
    assert_eq!(file.selected().len(), 3);
}

#[test]
fn test_append_marks_uncommitted() {
    let mut file = create_test_file(&["a"]);
    let entry = LocaleEntry::default();
    let id = entry.id();

    file.append(entry);
    assert!(file.contains(id));
    assert!(file.changes_uncommitted);

    file.commit_changes();
    assert!(!file.changes_uncommitted);
}

#[test]
fn test_remove_detaches_flat_node() {
    let mut file = create_test_file(&["a", "b"]);
    let id = file.entries[0].id();
    let node = file.entries[0].source_node().unwrap();

    let removed = file.remove(id).unwrap();
    assert_eq!(removed.key(), "a");
    assert_eq!(file.len(), 1);
    assert!(file.changes_uncommitted);
    assert!(node.borrow().parent().is_none());
    assert_eq!(file.resource.first_region().unwrap().borrow().child_count(), 1);

    assert!(file.remove(id).is_none());
}

#[test]
fn test_entry_lookup_across_files() {
    let mut files = vec![create_test_file(&["a"]), create_test_file(&["b"])];
    let id = files[1].entries[0].id();

    let entry = files.entry_mut(id).unwrap();
    assert_eq!(entry.key(), "b");
}

#[test]
fn test_dirty_tracking_and_commit() {
    let mut file = create_test_file(&["a"]);
    assert!(!file.has_dirty_entries());

    file.entries[0].set_content("changed", None);
    assert!(file.has_dirty_entries());

    file.commit_changes();
    assert!(!file.has_dirty_entries());
}

#[test]
fn test_stats() {
    let mut file = create_test_file(&["a", "b"]);
    file.entries[0].set_selected(true);
    file.entries[1].set_content("  ", None);

    let stats = file.get_stats();
    assert_eq!(stats.entry_count, 2);
    assert_eq!(stats.selected_count, 1);
    assert_eq!(stats.dirty_count, 1);
    assert_eq!(stats.empty_content_count, 1);
    assert_eq!(stats.format, "LSB");

    let text = stats.to_string();
    assert!(text.contains("条目数量: 2"));
}

#[test]
fn test_reference_node() {
    let file = create_test_file(&["a"]);
    let node = file.reference_node().unwrap();
    assert_eq!(node.borrow().name, "TranslatedStringKey");

    let empty = create_test_file(&[]);
    assert!(empty.reference_node().is_none());
}
