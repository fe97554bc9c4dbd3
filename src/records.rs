use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::paths::{self, Breadcrumb};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileRecord {
    pub id: String,
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    pub last_modified: DateTime<Utc>,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl FileRecord {
    pub fn parent_path(&self) -> &str {
        paths::parent_of_file(&self.path)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FolderRecord {
    pub id: String,
    pub name: String,
    pub path: String,
    pub parent_path: String,
}

impl FolderRecord {
    pub(crate) fn new(id: String, name: &str, parent_path: &str) -> FolderRecord {
        FolderRecord {
            id,
            name: name.to_string(),
            path: paths::join_folder(parent_path, name),
            parent_path: parent_path.to_string(),
        }
    }
}

/// A file offered for upload. Read-only to the store.
#[derive(Debug, Clone)]
pub struct FileHandle {
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    pub last_modified: DateTime<Utc>,
    pub contents: Bytes,
}

impl FileHandle {
    pub fn new(name: &str, mime_type: &str, last_modified: DateTime<Utc>, contents: Bytes) -> FileHandle {
        FileHandle {
            name: name.to_string(),
            size: contents.len() as u64,
            mime_type: mime_type.to_string(),
            last_modified,
            contents,
        }
    }
}

/// What a user sees when looking at one directory.
#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    pub path: String,
    pub breadcrumbs: Vec<Breadcrumb>,
    pub folders: Vec<FolderRecord>,
    pub files: Vec<FileRecord>,
    pub is_loading: bool,
    pub is_empty: bool,
}

/// The payload handed back when a file is saved to the user's machine.
#[derive(Debug, Clone)]
pub struct Download {
    pub name: String,
    pub mime_type: String,
    pub contents: Bytes,
}
