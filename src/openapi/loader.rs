use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::OpenApiDocument;

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse YAML document {}: {source}", .path.display())]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("failed to parse JSON document {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("unsupported document extension: {}", .0.display())]
    UnsupportedExtension(PathBuf),
}

/// Loads every `.yml`, `.yaml` and `.json` document in `dir`, keyed by file
/// name.
///
/// A missing directory yields an empty set. Documents that fail to parse are
/// logged and skipped.
pub fn load_documents(dir: &Path) -> BTreeMap<String, OpenApiDocument> {
    let mut documents = BTreeMap::new();

    if !dir.is_dir() {
        info!("OpenAPI schema directory not found: {}", dir.display());
        return documents;
    }

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!("failed to list schema directory {}: {}", dir.display(), err);
            return documents;
        }
    };

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && document_kind(path).is_some())
        .collect();
    paths.sort();

    for path in paths {
        let Some(name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };

        match load_document(&path) {
            Ok(document) => {
                debug!(
                    name = %name,
                    paths = document.paths.len(),
                    definitions = document.definitions().len(),
                    "loaded OpenAPI document"
                );
                documents.insert(name, document);
            }
            Err(err) => warn!("skipping schema: {}", err),
        }
    }

    info!(
        "loaded {} OpenAPI document(s) from {}",
        documents.len(),
        dir.display()
    );
    documents
}

/// Loads a single document, picking the parser from the file extension.
pub fn load_document(path: &Path) -> Result<OpenApiDocument, LoadError> {
    let kind = document_kind(path).ok_or_else(|| LoadError::UnsupportedExtension(path.into()))?;

    let raw = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.into(),
        source,
    })?;

    match kind {
        DocumentKind::Yaml => {
            OpenApiDocument::from_yaml_str(&raw).map_err(|source| LoadError::Yaml {
                path: path.into(),
                source,
            })
        }
        DocumentKind::Json => {
            OpenApiDocument::from_json_str(&raw).map_err(|source| LoadError::Json {
                path: path.into(),
                source,
            })
        }
    }
}

enum DocumentKind {
    Yaml,
    Json,
}

fn document_kind(path: &Path) -> Option<DocumentKind> {
    match path.extension()?.to_str()? {
        "yml" | "yaml" => Some(DocumentKind::Yaml),
        "json" => Some(DocumentKind::Json),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const MINIMAL_YAML: &str = "openapi: 3.0.0\npaths:\n  /a:\n    get:\n      responses:\n        204:\n          description: none\n";

    #[test]
    fn missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let documents = load_documents(&dir.path().join("nope"));
        assert!(documents.is_empty());
    }

    #[test]
    fn loads_yaml_and_json_documents() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.yaml"), MINIMAL_YAML).unwrap();
        fs::write(dir.path().join("b.yml"), MINIMAL_YAML).unwrap();
        fs::write(
            dir.path().join("c.json"),
            r#"{"openapi": "3.0.0", "paths": {"/c": {}}}"#,
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "not a schema").unwrap();

        let documents = load_documents(dir.path());

        let names: Vec<&str> = documents.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["a.yaml", "b.yml", "c.json"]);
        assert!(documents["c.json"].paths.contains_key("/c"));
    }

    #[test]
    fn broken_documents_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("good.yaml"), MINIMAL_YAML).unwrap();
        fs::write(dir.path().join("bad.yaml"), "paths: [unterminated").unwrap();

        let documents = load_documents(dir.path());
        assert_eq!(documents.len(), 1);
        assert!(documents.contains_key("good.yaml"));
    }

    #[test]
    fn load_document_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{").unwrap();

        let err = load_document(&path).unwrap_err();
        assert!(matches!(err, LoadError::Json { .. }));
        assert!(err.to_string().contains("bad.json"));
    }

    #[test]
    fn load_document_rejects_unknown_extensions() {
        let err = load_document(Path::new("schema.toml")).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedExtension(_)));
    }
}
