use crate::core::Storage;
use crate::utils::error::Result;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }
}

impl Storage for LocalStorage {
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(full_path, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_file_creates_output_directory() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("output");
        let storage = LocalStorage::new(base.to_str().unwrap().to_string());

        storage
            .write_file("abc-123.json", b"{\"id\": \"abc-123\"}")
            .await
            .unwrap();

        let written = fs::read_to_string(base.join("abc-123.json")).unwrap();
        assert_eq!(written, "{\"id\": \"abc-123\"}");
    }

    #[tokio::test]
    async fn test_write_file_overwrites_existing_file() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path().to_str().unwrap().to_string());

        storage.write_file("a.json", b"first").await.unwrap();
        storage.write_file("a.json", b"second").await.unwrap();

        let written = fs::read_to_string(dir.path().join("a.json")).unwrap();
        assert_eq!(written, "second");
    }
}
