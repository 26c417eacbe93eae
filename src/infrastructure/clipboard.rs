// File-backed clipboard for the dashboard YAML export
use crate::application::setup_helper::{Clipboard, ClipboardError};
use async_trait::async_trait;
use std::path::PathBuf;

pub struct FileClipboard {
    path: Option<PathBuf>,
}

impl FileClipboard {
    pub fn new(path: Option<impl Into<PathBuf>>) -> Self {
        Self {
            path: path.map(Into::into),
        }
    }
}

#[async_trait]
impl Clipboard for FileClipboard {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let path = self
            .path
            .as_ref()
            .ok_or_else(|| ClipboardError::Unavailable("no export path configured".to_string()))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, text).await?;
        tracing::info!("Wrote {} bytes to {}", text.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_creates_file() {
        let dir = std::env::temp_dir().join(format!("btc-clipboard-{}", std::process::id()));
        let path = dir.join("nested").join("dashboard.yaml");
        let clipboard = FileClipboard::new(Some(path.clone()));

        clipboard.write_text("title: x\n").await.unwrap();
        assert_eq!(tokio::fs::read_to_string(&path).await.unwrap(), "title: x\n");

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_without_path_is_unavailable() {
        let clipboard = FileClipboard::new(None::<PathBuf>);
        assert!(matches!(
            clipboard.write_text("x").await,
            Err(ClipboardError::Unavailable(_))
        ));
    }
}
