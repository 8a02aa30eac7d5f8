//! Persistent annotation storage, sharing the comment store's file family

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::comments::CommentStore;
use crate::viewer::Annotation;

/// Saves a document's annotations next to its comments.
///
/// Unlike [`CommentStore`] this holds no data of its own; the annotations
/// live in the document state and are written through here after every
/// mutation.
pub struct AnnotationStore {
    pub file_path: PathBuf,
}

impl AnnotationStore {
    /// Open the store for a document id and load whatever was saved before.
    ///
    /// Directory resolution matches the comment store, so both files for a
    /// document always sit side by side.
    pub fn open(
        document_id: &str,
        annotations_dir: Option<&Path>,
    ) -> Result<(Self, Vec<Annotation>)> {
        let resolved_dir = match annotations_dir {
            Some(dir) => dir.to_path_buf(),
            None => CommentStore::default_dir()?,
        };

        if !resolved_dir.exists() {
            fs::create_dir_all(&resolved_dir).with_context(|| {
                format!("Failed to create annotations directory: {resolved_dir:?}")
            })?;
        }

        let file_path = resolved_dir.join(format!("doc_{document_id}_annotations.yaml"));
        let annotations = if file_path.exists() {
            let content =
                fs::read_to_string(&file_path).context("Failed to read annotations file")?;
            if content.trim().is_empty() {
                Vec::new()
            } else {
                serde_yaml::from_str(&content).context("Failed to parse annotations YAML")?
            }
        } else {
            Vec::new()
        };

        Ok((Self { file_path }, annotations))
    }

    /// Write the full annotation list, replacing the previous file
    pub fn save(&self, annotations: &[Annotation]) -> Result<()> {
        let yaml =
            serde_yaml::to_string(annotations).context("Failed to serialize annotations")?;
        fs::write(&self.file_path, yaml).context("Failed to write annotations file")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewer::AnnotationKind;
    use tempfile::TempDir;

    #[test]
    fn fresh_store_is_empty() {
        let dir = TempDir::new().unwrap();
        let (store, loaded) = AnnotationStore::open("doc1", Some(dir.path())).unwrap();

        assert!(loaded.is_empty());
        assert!(store
            .file_path
            .ends_with("doc_doc1_annotations.yaml"));
    }

    #[test]
    fn annotations_survive_reopen() {
        let dir = TempDir::new().unwrap();

        let (store, _) = AnnotationStore::open("doc1", Some(dir.path())).unwrap();
        let annotations = vec![
            Annotation::highlight(1, 100.0, 50.0, "ana"),
            Annotation::drawing(3, 20.0, 30.0, "bo"),
        ];
        store.save(&annotations).unwrap();

        let (_, loaded) = AnnotationStore::open("doc1", Some(dir.path())).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].kind, AnnotationKind::Highlight);
        assert_eq!(loaded[1].page, 3);
        assert_eq!(loaded[1].author, "bo");
    }

    #[test]
    fn save_replaces_previous_contents() {
        let dir = TempDir::new().unwrap();
        let (store, _) = AnnotationStore::open("doc1", Some(dir.path())).unwrap();

        store
            .save(&[Annotation::highlight(1, 0.0, 0.0, "ana")])
            .unwrap();
        store.save(&[]).unwrap();

        let (_, loaded) = AnnotationStore::open("doc1", Some(dir.path())).unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn sits_next_to_the_comment_store() {
        let dir = TempDir::new().unwrap();
        let comments = CommentStore::open("doc1", Some(dir.path())).unwrap();
        let (store, _) = AnnotationStore::open("doc1", Some(dir.path())).unwrap();

        assert_eq!(
            comments.file_path.parent(),
            store.file_path.parent()
        );
    }
}
