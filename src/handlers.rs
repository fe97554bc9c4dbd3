use bytes::{BufMut, Bytes, BytesMut};
use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::convert::Infallible;
use tokio_stream::StreamExt;
use tracing::instrument;
use warp::http::StatusCode;
use warp::multipart::{FormData, Part};
use warp::reply::Reply;
use warp::{http::Response, hyper::Body};

use crate::display::{self, FileSummary};
use crate::paths::Breadcrumb;
use crate::records::{FileHandle, FolderRecord, Listing};
use crate::server::AppState;

const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

type HandlerResult = Result<warp::reply::Response, Infallible>;

#[derive(Serialize)]
struct ListingView {
    path: String,
    breadcrumbs: Vec<Breadcrumb>,
    folders: Vec<FolderRecord>,
    files: Vec<FileSummary>,
    is_loading: bool,
    is_empty: bool,
}

impl ListingView {
    fn new(listing: Listing, now: DateTime<Utc>) -> ListingView {
        ListingView {
            files: listing
                .files
                .iter()
                .map(|file| display::summarize(file, now))
                .collect(),
            path: listing.path,
            breadcrumbs: listing.breadcrumbs,
            folders: listing.folders,
            is_loading: listing.is_loading,
            is_empty: listing.is_empty,
        }
    }
}

fn bad_request(message: String) -> warp::reply::Response {
    tracing::error!("{}", message);
    warp::reply::with_status(warp::reply::json(&message), StatusCode::BAD_REQUEST).into_response()
}

fn listing_response(state: &AppState) -> warp::reply::Response {
    let view = ListingView::new(state.store.list(), state.store.now());
    warp::reply::json(&view).into_response()
}

#[instrument(name = "handlers.get_version", level = "info")]
pub(crate) async fn get_version() -> HandlerResult {
    Ok(warp::reply::with_status(
        warp::reply::json(&env!("CARGO_PKG_VERSION").to_string()),
        StatusCode::OK,
    )
    .into_response())
}

#[instrument(name = "handlers.get_listing", level = "info", skip(state))]
pub(crate) async fn get_listing(state: AppState) -> HandlerResult {
    Ok(listing_response(&state))
}

#[instrument(name = "handlers.get_breadcrumbs", level = "info", skip(state))]
pub(crate) async fn get_breadcrumbs(state: AppState) -> HandlerResult {
    Ok(warp::reply::json(&state.store.breadcrumbs()).into_response())
}

#[instrument(name = "handlers.get_progress", level = "debug", skip(state))]
pub(crate) async fn get_progress(state: AppState) -> HandlerResult {
    let mut output = HashMap::new();
    output.insert("progress", state.store.progress());
    output.insert("active", state.store.active_uploads());
    Ok(warp::reply::json(&output).into_response())
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
}

async fn read_part(mut part: Part) -> Result<Bytes, String> {
    let mut contents = BytesMut::new();
    while let Some(chunk) = part.data().await {
        let chunk = chunk.map_err(|e| format!("Could not read upload: {}", e))?;
        contents.put(chunk);
    }
    Ok(contents.freeze())
}

/// Every `file` part becomes one handle. The n-th `last_modified` field (unix
/// milliseconds) belongs to the n-th file; files without one use `now`.
async fn read_upload_form(mut form: FormData, now: DateTime<Utc>) -> Result<Vec<FileHandle>, String> {
    let mut files = Vec::new();
    let mut timestamps = Vec::new();
    while let Some(part) = form.next().await {
        let part = part.map_err(|e| format!("Could not read upload: {}", e))?;
        let field = part.name().to_string();
        match field.as_str() {
            "file" => {
                let name = match part.filename() {
                    Some(name) if !name.trim().is_empty() => name.to_string(),
                    _ => return Err("Missing file name".to_string()),
                };
                let mime_type = part.content_type().unwrap_or(DEFAULT_MIME_TYPE).to_string();
                let contents = read_part(part).await?;
                files.push((name, mime_type, contents));
            }
            "last_modified" => {
                let raw = read_part(part).await?;
                let raw = String::from_utf8_lossy(&raw).to_string();
                let timestamp = parse_timestamp(&raw)
                    .ok_or_else(|| format!("Invalid last_modified field {}", raw))?;
                timestamps.push(timestamp);
            }
            other => tracing::warn!("Ignoring unknown form field {}", other),
        }
    }
    if files.is_empty() {
        return Err("No files in upload".to_string());
    }
    Ok(files
        .into_iter()
        .enumerate()
        .map(|(index, (name, mime_type, contents))| {
            let last_modified = timestamps.get(index).copied().unwrap_or(now);
            FileHandle::new(&name, &mime_type, last_modified, contents)
        })
        .collect())
}

#[instrument(name = "handlers.upload_files", level = "info", skip(form, state))]
pub(crate) async fn upload_files(form: FormData, state: AppState) -> HandlerResult {
    let handles = match read_upload_form(form, state.store.now()).await {
        Ok(handles) => handles,
        Err(message) => return Ok(bad_request(message)),
    };

    match state.store.upload_files(handles).await {
        Ok(report) => {
            let status = if report.failed.is_empty() {
                StatusCode::OK
            } else {
                StatusCode::BAD_GATEWAY
            };
            Ok(warp::reply::with_status(warp::reply::json(&report), status).into_response())
        }
        Err(e) => Ok(e.into_response()),
    }
}

#[instrument(name = "handlers.delete_file", level = "info", skip(state))]
pub(crate) async fn delete_file(id: String, state: AppState) -> HandlerResult {
    match state.store.delete_file(&id).await {
        Ok(()) => Ok(warp::reply::with_status(
            warp::reply::json(&format!("File {} deleted", id)),
            StatusCode::OK,
        )
        .into_response()),
        Err(e) => Ok(e.into_response()),
    }
}

#[instrument(name = "handlers.download_file", level = "info", skip(state))]
pub(crate) async fn download_file(id: String, state: AppState) -> HandlerResult {
    let download = match state.store.download_file(&id) {
        Ok(download) => download,
        Err(e) => return Ok(e.into_response()),
    };
    let disposition = format!("attachment; filename=\"{}\"", download.name.replace('"', "'"));
    let response = Response::builder()
        .status(StatusCode::OK)
        .header("content-type", download.mime_type)
        .header("content-disposition", disposition)
        .body(Body::from(download.contents));
    match response {
        Ok(response) => Ok(response),
        Err(e) => {
            tracing::error!("Could not build download response: {}", e);
            Ok(warp::reply::with_status(
                warp::reply::json(&"Could not build download response".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            )
            .into_response())
        }
    }
}

#[instrument(name = "handlers.create_folder", level = "info", skip(state))]
pub(crate) async fn create_folder(mut params: HashMap<String, String>, state: AppState) -> HandlerResult {
    let name = params.remove("name").unwrap_or_default();
    match state.store.create_folder(&name).await {
        Ok(folder) => Ok(warp::reply::with_status(warp::reply::json(&folder), StatusCode::CREATED)
            .into_response()),
        Err(e) => Ok(e.into_response()),
    }
}

#[instrument(name = "handlers.delete_folder", level = "info", skip(state))]
pub(crate) async fn delete_folder(id: String, state: AppState) -> HandlerResult {
    match state.store.delete_folder(&id).await {
        Ok(()) => Ok(warp::reply::with_status(
            warp::reply::json(&format!("Folder {} deleted", id)),
            StatusCode::OK,
        )
        .into_response()),
        Err(e) => Ok(e.into_response()),
    }
}

#[instrument(name = "handlers.navigate", level = "info", skip(state))]
pub(crate) async fn navigate(mut params: HashMap<String, String>, state: AppState) -> HandlerResult {
    match params.remove("path") {
        Some(path) => {
            state.store.navigate_to_folder(&path);
            Ok(listing_response(&state))
        }
        None => Ok(bad_request("Missing path argument".to_string())),
    }
}

#[instrument(name = "handlers.navigate_up", level = "info", skip(state))]
pub(crate) async fn navigate_up(state: AppState) -> HandlerResult {
    state.store.navigate_up();
    Ok(listing_response(&state))
}

#[instrument(name = "handlers.drain_notifications", level = "debug", skip(state))]
pub(crate) async fn drain_notifications(state: AppState) -> HandlerResult {
    Ok(warp::reply::json(&state.notifications.drain()).into_response())
}
