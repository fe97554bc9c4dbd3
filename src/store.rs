// The virtual file system behind the file manager. Everything lives in memory:
// files, folders, the directory being viewed and the progress of running
// uploads. Backend calls are simulated through the injected clock and endpoint.

mod upload;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::task::JoinSet;
use tracing::instrument;

use crate::clock::{Clock, TokioClock};
use crate::config::StoreConfig;
use crate::endpoint::{MockEndpoint, StorageEndpoint};
use crate::errors::{Result, StorageError, StorageErrorType};
use crate::ids::{IdGenerator, UuidGenerator};
use crate::notify::{NotificationLog, Notifier};
use crate::objects::ObjectUrls;
use crate::paths::{self, Breadcrumb};
use crate::records::{Download, FileHandle, FileRecord, FolderRecord, Listing};

#[derive(Clone)]
pub struct FileStore {
    inner: Arc<Inner>,
}

struct Inner {
    state: Mutex<State>,
    config: StoreConfig,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    notifier: Arc<dyn Notifier>,
    endpoint: Arc<dyn StorageEndpoint>,
    objects: ObjectUrls,
}

struct State {
    files: Vec<FileRecord>,
    folders: Vec<FolderRecord>,
    current_path: String,
    in_flight: usize,
    progress: HashMap<String, u8>,
}

impl State {
    fn holds_items(&self, folder: &FolderRecord) -> bool {
        self.files.iter().any(|file| file.path.starts_with(&folder.path))
            || self
                .folders
                .iter()
                .any(|other| other.id != folder.id && other.path.starts_with(&folder.path))
    }
}

/// Result of an upload batch. Failed files leave no record behind.
#[derive(Debug, Clone, Serialize)]
pub struct UploadReport {
    pub committed: Vec<FileRecord>,
    pub failed: Vec<String>,
}

pub struct StoreBuilder {
    config: StoreConfig,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    notifier: Arc<dyn Notifier>,
    endpoint: Arc<dyn StorageEndpoint>,
}

impl StoreBuilder {
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn ids(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn endpoint(mut self, endpoint: Arc<dyn StorageEndpoint>) -> Self {
        self.endpoint = endpoint;
        self
    }

    pub fn build(self) -> FileStore {
        FileStore {
            inner: Arc::new(Inner {
                state: Mutex::new(State {
                    files: Vec::new(),
                    folders: Vec::new(),
                    current_path: paths::ROOT.to_string(),
                    in_flight: 0,
                    progress: HashMap::new(),
                }),
                config: self.config,
                clock: self.clock,
                ids: self.ids,
                notifier: self.notifier,
                endpoint: self.endpoint,
                objects: ObjectUrls::new(),
            }),
        }
    }
}

/// Marks the store as busy until dropped, whichever way the operation ends.
struct LoadingGuard<'a> {
    state: &'a Mutex<State>,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.lock() {
            state.in_flight = state.in_flight.saturating_sub(1);
        }
    }
}

/// The directory an operation writes into, taken when it starts.
struct Origin {
    path: String,
    folder: Option<String>,
}

impl Origin {
    fn vanished(&self, state: &State) -> bool {
        match &self.folder {
            Some(id) => !state.folders.iter().any(|folder| &folder.id == id),
            None => false,
        }
    }
}

/// Clears a batch's progress entries after the settle delay, whether the
/// batch finished, failed or was dropped half way.
struct SettleGuard {
    inner: Arc<Inner>,
    ids: Vec<String>,
}

impl Drop for SettleGuard {
    fn drop(&mut self) {
        let ids = std::mem::take(&mut self.ids);
        if ids.is_empty() {
            return;
        }
        let inner = self.inner.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(async move {
                    inner.clock.sleep(inner.config.settle_delay()).await;
                    clear_progress(&inner, &ids);
                });
            }
            Err(_) => clear_progress(&inner, &ids),
        }
    }
}

fn clear_progress(inner: &Inner, ids: &[String]) {
    if let Ok(mut state) = inner.state.lock() {
        for id in ids {
            state.progress.remove(id);
        }
    }
}

impl FileStore {
    pub fn builder(config: StoreConfig) -> StoreBuilder {
        let capacity = config.notification_capacity;
        StoreBuilder {
            config,
            clock: Arc::new(TokioClock),
            ids: Arc::new(UuidGenerator),
            notifier: Arc::new(NotificationLog::new(capacity)),
            endpoint: Arc::new(MockEndpoint),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    fn begin_loading(&self) -> (LoadingGuard<'_>, Origin) {
        let mut state = self.inner.state.lock().unwrap();
        state.in_flight += 1;
        let origin = Origin {
            folder: state
                .folders
                .iter()
                .find(|folder| folder.path == state.current_path)
                .map(|folder| folder.id.clone()),
            path: state.current_path.clone(),
        };
        let guard = LoadingGuard {
            state: &self.inner.state,
        };
        (guard, origin)
    }

    async fn backend_call<F>(&self, call: F) -> Result<()>
    where
        F: FnOnce(&dyn StorageEndpoint) -> Result<()>,
    {
        self.inner.clock.sleep(self.inner.config.latency()).await;
        self.inner.endpoint.is_available()?;
        call(self.inner.endpoint.as_ref())
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.inner.clock.now()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.lock().unwrap().in_flight > 0
    }

    pub fn current_path(&self) -> String {
        self.inner.state.lock().unwrap().current_path.clone()
    }

    pub fn files(&self) -> Vec<FileRecord> {
        self.inner.state.lock().unwrap().files.clone()
    }

    pub fn folders(&self) -> Vec<FolderRecord> {
        self.inner.state.lock().unwrap().folders.clone()
    }

    pub fn progress(&self) -> HashMap<String, u8> {
        self.inner.state.lock().unwrap().progress.clone()
    }

    /// Uploads that have started but not yet finished.
    pub fn active_uploads(&self) -> HashMap<String, u8> {
        let state = self.inner.state.lock().unwrap();
        state
            .progress
            .iter()
            .filter(|(_, percent)| **percent > 0 && **percent < 100)
            .map(|(id, percent)| (id.clone(), *percent))
            .collect()
    }

    pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
        paths::compute_breadcrumbs(&self.current_path(), &self.inner.config.root_label)
    }

    pub fn list(&self) -> Listing {
        let state = self.inner.state.lock().unwrap();
        let path = state.current_path.clone();
        let folders: Vec<FolderRecord> = state
            .folders
            .iter()
            .filter(|folder| folder.parent_path == path)
            .cloned()
            .collect();
        let files: Vec<FileRecord> = state
            .files
            .iter()
            .filter(|file| file.parent_path() == path)
            .cloned()
            .collect();
        Listing {
            breadcrumbs: paths::compute_breadcrumbs(&path, &self.inner.config.root_label),
            is_empty: folders.is_empty() && files.is_empty(),
            is_loading: state.in_flight > 0,
            path,
            folders,
            files,
        }
    }

    #[instrument(name = "store.upload_files", level = "info", skip(self, handles), fields(count = handles.len()))]
    pub async fn upload_files(&self, handles: Vec<FileHandle>) -> Result<UploadReport> {
        if handles.is_empty() {
            return Ok(UploadReport {
                committed: Vec::new(),
                failed: Vec::new(),
            });
        }
        let (_loading, origin) = self.begin_loading();
        let mut settle = SettleGuard {
            inner: self.inner.clone(),
            ids: Vec::with_capacity(handles.len()),
        };
        let mut tasks = JoinSet::new();
        for (index, handle) in handles.into_iter().enumerate() {
            let id = self.inner.ids.next_id();
            settle.ids.push(id.clone());
            let inner = self.inner.clone();
            tasks.spawn(async move {
                let result = upload::simulate(&inner, &id, &handle).await;
                (index, id, handle, result)
            });
        }

        let mut outcomes = Vec::with_capacity(settle.ids.len());
        while let Some(joined) = tasks.join_next().await {
            outcomes.push(joined?);
        }
        outcomes.sort_by_key(|(index, ..)| *index);

        let mut committed = Vec::new();
        let mut failed = Vec::new();
        for (_, id, handle, result) in outcomes {
            match result {
                Ok(()) => committed.push(FileRecord {
                    url: Some(self.inner.objects.allocate(self.inner.ids.as_ref(), &handle)),
                    path: paths::join_file(&origin.path, &handle.name),
                    id,
                    name: handle.name,
                    size: handle.size,
                    mime_type: handle.mime_type,
                    last_modified: handle.last_modified,
                }),
                Err(e) => {
                    tracing::error!("Upload of {} failed: {}", handle.name, e);
                    self.inner.state.lock().unwrap().progress.remove(&id);
                    failed.push(handle.name);
                }
            }
        }

        let orphaned = {
            let mut state = self.inner.state.lock().unwrap();
            if origin.vanished(&state) {
                true
            } else {
                state.files.extend(committed.iter().cloned());
                false
            }
        };
        if orphaned {
            tracing::error!("Folder {} was deleted during the upload", origin.path);
            for record in committed.drain(..) {
                if let Some(url) = &record.url {
                    self.inner.objects.revoke(url);
                }
                failed.push(record.name);
            }
        }

        if !committed.is_empty() {
            self.inner
                .notifier
                .success(format!("{} files uploaded successfully", committed.len()));
        }
        if !failed.is_empty() {
            self.inner.notifier.error("Failed to upload files".to_string());
        }
        Ok(UploadReport { committed, failed })
    }

    #[instrument(name = "store.delete_file", level = "info", skip(self))]
    pub async fn delete_file(&self, id: &str) -> Result<()> {
        let (_loading, _) = self.begin_loading();
        let record = self
            .inner
            .state
            .lock()
            .unwrap()
            .files
            .iter()
            .find(|file| file.id == id)
            .cloned();

        if let Err(e) = self.backend_call(|endpoint| endpoint.delete_file(record.as_ref())).await {
            tracing::error!("Error deleting file {}: {}", id, e);
            self.inner.notifier.error("Failed to delete file".to_string());
            return Err(e);
        }

        match record {
            Some(record) => {
                self.inner
                    .state
                    .lock()
                    .unwrap()
                    .files
                    .retain(|file| file.id != id);
                if let Some(url) = &record.url {
                    self.inner.objects.revoke(url);
                }
                self.inner
                    .notifier
                    .success(format!("{} deleted successfully", record.name));
                Ok(())
            }
            None => {
                tracing::warn!("No file with id {} to delete", id);
                self.inner.notifier.error("Failed to delete file".to_string());
                Err(StorageError::not_found(format!("No file with id {}", id)))
            }
        }
    }

    #[instrument(name = "store.download_file", level = "info", skip(self))]
    pub fn download_file(&self, id: &str) -> Result<Download> {
        let download = self.find_download(id);
        match download {
            Ok(download) => {
                self.inner
                    .notifier
                    .success(format!("Downloading {}", download.name));
                Ok(download)
            }
            Err(e) => {
                tracing::error!("Error downloading file {}: {}", id, e);
                self.inner.notifier.error("Failed to download file".to_string());
                Err(e)
            }
        }
    }

    fn find_download(&self, id: &str) -> Result<Download> {
        let record = self
            .inner
            .state
            .lock()
            .unwrap()
            .files
            .iter()
            .find(|file| file.id == id)
            .cloned()
            .ok_or_else(|| StorageError::not_found("File not found"))?;
        let url = record
            .url
            .as_deref()
            .ok_or_else(|| StorageError::not_found("File not found"))?;
        let contents = self
            .inner
            .objects
            .resolve(url)
            .ok_or_else(|| StorageError::not_found("File not found"))?;
        Ok(Download {
            name: record.name,
            mime_type: record.mime_type,
            contents,
        })
    }

    #[instrument(name = "store.create_folder", level = "info", skip(self))]
    pub async fn create_folder(&self, name: &str) -> Result<FolderRecord> {
        let name = name.trim();
        if name.is_empty() {
            self.inner
                .notifier
                .error("Folder name cannot be empty".to_string());
            return Err(StorageError::new(
                StorageErrorType::InvalidName,
                "Folder name cannot be empty".to_string(),
            ));
        }
        if name.contains(paths::SEPARATOR) {
            self.inner
                .notifier
                .error(format!("Folder name cannot contain '{}'", paths::SEPARATOR));
            return Err(StorageError::new(
                StorageErrorType::InvalidName,
                format!("Folder name {} contains a path separator", name),
            ));
        }

        let (_loading, origin) = self.begin_loading();
        let path = paths::join_folder(&origin.path, name);
        if let Err(e) = self.backend_call(|endpoint| endpoint.create_folder(&path)).await {
            tracing::error!("Error creating folder {}: {}", path, e);
            self.inner.notifier.error("Failed to create folder".to_string());
            return Err(e);
        }

        let folder = FolderRecord::new(self.inner.ids.next_id(), name, &origin.path);
        let orphaned = {
            let mut state = self.inner.state.lock().unwrap();
            if origin.vanished(&state) {
                true
            } else {
                state.folders.push(folder.clone());
                false
            }
        };
        if orphaned {
            tracing::error!("Folder {} was deleted before {} was created", origin.path, name);
            self.inner.notifier.error("Failed to create folder".to_string());
            return Err(StorageError::not_found(format!(
                "Folder {} no longer exists",
                origin.path
            )));
        }
        self.inner
            .notifier
            .success(format!("Folder \"{}\" created", name));
        Ok(folder)
    }

    /// Remove a folder. Folders which still hold files or folders are kept.
    #[instrument(name = "store.delete_folder", level = "info", skip(self))]
    pub async fn delete_folder(&self, id: &str) -> Result<()> {
        let folder = {
            let state = self.inner.state.lock().unwrap();
            state
                .folders
                .iter()
                .find(|folder| folder.id == id)
                .cloned()
                .map(|folder| {
                    let occupied = state.holds_items(&folder);
                    (folder, occupied)
                })
        };

        let folder = match folder {
            None => {
                self.inner.notifier.error("Failed to delete folder".to_string());
                return Err(StorageError::not_found(format!("No folder with id {}", id)));
            }
            Some((folder, true)) => return Err(self.not_empty(&folder)),
            Some((folder, false)) => folder,
        };

        let (_loading, _) = self.begin_loading();
        if let Err(e) = self.backend_call(|endpoint| endpoint.delete_folder(&folder.path)).await {
            tracing::error!("Error deleting folder {}: {}", folder.path, e);
            self.inner.notifier.error("Failed to delete folder".to_string());
            return Err(e);
        }
        // Something may have landed in the folder while the backend call ran
        let removed = {
            let mut state = self.inner.state.lock().unwrap();
            if state.holds_items(&folder) {
                false
            } else {
                state.folders.retain(|other| other.id != folder.id);
                true
            }
        };
        if !removed {
            return Err(self.not_empty(&folder));
        }
        self.inner
            .notifier
            .success(format!("Folder \"{}\" deleted", folder.name));
        Ok(())
    }

    fn not_empty(&self, folder: &FolderRecord) -> StorageError {
        self.inner
            .notifier
            .error(format!("Folder \"{}\" is not empty", folder.name));
        StorageError::new(
            StorageErrorType::NotEmpty,
            format!("Path {} is a folder which contains items", folder.path),
        )
    }

    /// Change directory. The path does not have to name an existing folder.
    #[instrument(name = "store.navigate_to_folder", level = "debug", skip(self))]
    pub fn navigate_to_folder(&self, path: &str) {
        let path = paths::normalize(path);
        self.inner.state.lock().unwrap().current_path = path;
    }

    #[instrument(name = "store.navigate_up", level = "debug", skip(self))]
    pub fn navigate_up(&self) {
        let mut state = self.inner.state.lock().unwrap();
        if paths::is_root(&state.current_path) {
            return;
        }
        state.current_path = paths::parent_path(&state.current_path);
    }
}
