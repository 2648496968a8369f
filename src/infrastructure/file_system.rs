use anyhow::{Context, Result};
use log::{debug, error, warn};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use crate::domain::error::RagError;

const TEXT_EXTENSIONS: [&str; 2] = ["txt", "md"];

/// Loads the text document(s) at `path`.
///
/// A file is read as a single document. A directory is walked recursively and
/// every `.txt` or `.md` file under it is read. Keys are file paths; the map
/// keeps them sorted so ingestion order is stable.
pub fn load_text_documents(path: &Path) -> Result<BTreeMap<String, String>> {
    if !path.exists() {
        return Err(RagError::InputNotFound(path.to_path_buf()).into());
    }

    let mut documents = BTreeMap::new();

    if path.is_file() {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        documents.insert(path.to_string_lossy().to_string(), content);
        return Ok(documents);
    }

    debug!("Loading text documents from directory: {:?}", path);
    let mut read_errors = 0;

    for entry in WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file() && has_text_extension(e.path()))
    {
        let file_path = entry.path();
        let path_str = file_path.to_string_lossy().to_string();

        match fs::read_to_string(file_path) {
            Ok(content) => {
                debug!("Successfully read: {}", path_str);
                documents.insert(path_str, content);
            }
            Err(e) => {
                error!("Failed to read file {}: {}", path_str, e);
                read_errors += 1;
            }
        }
    }

    if documents.is_empty() && read_errors == 0 {
        warn!("No text files found in {:?}", path);
    } else if read_errors > 0 {
        warn!("Encountered {} errors while reading files from {:?}", read_errors, path);
    }

    Ok(documents)
}

fn has_text_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| TEXT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_load_single_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("document.txt");
        let mut file = File::create(&file_path).unwrap();
        writeln!(file, "The quick brown fox.").unwrap();

        let documents = load_text_documents(&file_path).unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(
            documents.get(&file_path.to_string_lossy().to_string()),
            Some(&"The quick brown fox.\n".to_string())
        );
    }

    #[test]
    fn test_load_directory_filters_extensions() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir(root.join("sub")).unwrap();
        fs::write(root.join("a.txt"), "A").unwrap();
        fs::write(root.join("sub/b.md"), "B").unwrap();
        fs::write(root.join("c.TXT"), "C").unwrap();
        fs::write(root.join("image.png"), "not text").unwrap();

        let documents = load_text_documents(root).unwrap();
        assert_eq!(documents.len(), 3);
        assert!(!documents.contains_key(&root.join("image.png").to_string_lossy().to_string()));
        // sorted by path
        let keys: Vec<&String> = documents.keys().collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn test_load_empty_directory() {
        let dir = tempdir().unwrap();
        assert!(load_text_documents(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_load_missing_path() {
        let err = load_text_documents(Path::new("no/such/document.txt")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RagError>(),
            Some(RagError::InputNotFound(_))
        ));
    }
}
