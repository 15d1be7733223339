use thiserror::Error;
use std::path::{Path, PathBuf};

/// 自定义错误类型
#[derive(Error, Debug)]
pub enum LocaleError {
    #[error("Traversal failed: {0}")]
    Traversal(String),

    #[error("Binding failed: {0}")]
    Binding(String),

    #[error("Unsupported resource format: {0}")]
    UnsupportedFormat(String),

    #[error("Resource has no regions")]
    EmptyResource,

    #[error("Entry not found: {0}")]
    EntryNotFound(u64),

    #[error("Entry key is locked: {0}")]
    Locked(u64),

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,

    #[error("Invalid resource template: {0}")]
    Template(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// 本库统一使用的结果类型
pub type Result<T> = std::result::Result<T, LocaleError>;

/// 检查文件扩展名是否在给定列表中（忽略大小写）
pub fn file_extension_found(path: &Path, extensions: &[&str]) -> bool {
    let Some(extension) = path.extension().and_then(|ext| ext.to_str()) else {
        return false;
    };

    extensions
        .iter()
        .any(|candidate| candidate.trim_start_matches('.').eq_ignore_ascii_case(extension))
}

/// 创建文件备份
///
/// 备份文件名格式：`{文件名}_{时间戳}.{扩展名}`，写入 `backup_dir`。
pub fn create_backup(file_path: &Path, backup_dir: &Path) -> Result<PathBuf> {
    if !file_path.exists() {
        return Err(LocaleError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "原文件不存在",
        )));
    }

    let stem = file_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("backup");
    let timestamp = chrono::Local::now().format("%Y-%m-%d-%H-%M-%S");
    let file_name = match file_path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}_{}.{}", stem, timestamp, ext),
        None => format!("{}_{}", stem, timestamp),
    };

    std::fs::create_dir_all(backup_dir)?;
    let backup_path = backup_dir.join(file_name);
    std::fs::copy(file_path, &backup_path)?;

    Ok(backup_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_extension_found() {
        assert!(file_extension_found(Path::new("a/English.lsb"), &["lsb", "lsj"]));
        assert!(file_extension_found(Path::new("Dialog.LSJ"), &[".lsb", ".lsj"]));
        assert!(!file_extension_found(Path::new("notes.txt"), &["lsb"]));
        assert!(!file_extension_found(Path::new("no_extension"), &["lsb"]));
    }

    #[test]
    fn test_create_backup() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("English.lsb");
        std::fs::write(&source, b"data").unwrap();

        let backup_dir = temp_dir.path().join("backups");
        let backup = create_backup(&source, &backup_dir).unwrap();

        assert!(backup.starts_with(&backup_dir));
        assert_eq!(backup.extension().unwrap(), "lsb");
        assert_eq!(std::fs::read(&backup).unwrap(), b"data");
    }

    #[test]
    fn test_create_backup_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = create_backup(&temp_dir.path().join("missing.lsb"), temp_dir.path());
        assert!(matches!(result, Err(LocaleError::IoError(_))));
    }
}
