mod files;
mod folders;

use crate::handlers;
use crate::server::AppState;
use std::convert::Infallible;
use warp::Filter;

pub fn routes(
    state: AppState,
) -> impl warp::Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    version()
        .or(files::routes(state.clone()))
        .or(folders::routes(state.clone()))
        .or(notifications(state))
        .with(warp::trace::request())
}

pub(crate) fn with_state(
    state: AppState,
) -> impl Filter<Extract = (AppState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

fn version() -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path!("version")
        .and(warp::get())
        .and_then(handlers::get_version)
}

fn notifications(
    state: AppState,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path!("notifications")
        .and(warp::get())
        .and(with_state(state))
        .and_then(handlers::drain_notifications)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use serde_json::Value;
    use warp::http::StatusCode;

    const BOUNDARY: &str = "breezy-test-boundary";

    fn body_json(body: &[u8]) -> Value {
        serde_json::from_slice(body).unwrap()
    }

    fn file_part(name: &str, mime_type: &str, contents: &str) -> String {
        format!(
            "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n{}\r\n",
            BOUNDARY, name, mime_type, contents
        )
    }

    fn field_part(name: &str, value: &str) -> String {
        format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
            BOUNDARY, name, value
        )
    }

    fn upload_request(parts: &[String]) -> warp::test::RequestBuilder {
        let body = format!("{}--{}--\r\n", parts.concat(), BOUNDARY);
        warp::test::request()
            .method("POST")
            .path("/files")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(body)
    }

    fn messages(notes: &Value) -> Vec<String> {
        notes
            .as_array()
            .unwrap()
            .iter()
            .map(|n| n["message"].as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn upload_list_download_delete() {
        let state = AppState::new(StoreConfig::default());
        let api = routes(state.clone());

        let response = upload_request(&[
            file_part("notes.txt", "text/plain", "some notes"),
            field_part("last_modified", "1700000000000"),
        ])
        .reply(&api)
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let report = body_json(response.body());
        let id = report["committed"][0]["id"].as_str().unwrap().to_string();
        assert_eq!(report["committed"][0]["path"], "/notes.txt");
        assert_eq!(report["committed"][0]["last_modified"], "2023-11-14T22:13:20Z");

        let response = warp::test::request().path("/listing").reply(&api).await;
        let listing = body_json(response.body());
        assert_eq!(listing["files"][0]["name"], "notes.txt");
        assert_eq!(listing["files"][0]["kind"], "text");
        assert_eq!(listing["files"][0]["size_label"], "10 Bytes");
        assert_eq!(listing["breadcrumbs"][0]["name"], "Home");

        let response = warp::test::request()
            .path(&format!("/files/{}/download", id))
            .reply(&api)
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "text/plain");
        assert_eq!(
            response.headers()["content-disposition"],
            "attachment; filename=\"notes.txt\""
        );
        assert_eq!(response.body().as_ref(), b"some notes");

        let response = warp::test::request()
            .method("DELETE")
            .path(&format!("/files/{}", id))
            .reply(&api)
            .await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = warp::test::request()
            .path(&format!("/files/{}/download", id))
            .reply(&api)
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = warp::test::request().path("/notifications").reply(&api).await;
        assert_eq!(
            messages(&body_json(response.body())),
            vec![
                "1 files uploaded successfully",
                "Downloading notes.txt",
                "notes.txt deleted successfully",
                "Failed to download file",
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn one_upload_carries_a_whole_batch() {
        let state = AppState::new(StoreConfig::default());
        let api = routes(state.clone());

        let response = upload_request(&[
            file_part("a.txt", "text/plain", "first"),
            file_part("b.png", "image/png", "second"),
        ])
        .reply(&api)
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let report = body_json(response.body());
        assert_eq!(report["committed"].as_array().unwrap().len(), 2);
        assert_eq!(report["committed"][1]["name"], "b.png");
        assert_eq!(report["committed"][1]["mime_type"], "image/png");
        assert_eq!(state.store.files().len(), 2);

        let response = warp::test::request().path("/notifications").reply(&api).await;
        assert_eq!(
            messages(&body_json(response.body())),
            vec!["2 files uploaded successfully"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn upload_requires_a_file_name() {
        let state = AppState::new(StoreConfig::default());
        let api = routes(state.clone());
        let response = upload_request(&[field_part("file", "data")]).reply(&api).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = upload_request(&[field_part("last_modified", "1700000000000")])
            .reply(&api)
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = upload_request(&[
            file_part("a.txt", "text/plain", "x"),
            field_part("last_modified", "yesterday"),
        ])
        .reply(&api)
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(state.store.files().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn folders_and_navigation() {
        let state = AppState::new(StoreConfig::default());
        let api = routes(state.clone());

        let response = warp::test::request()
            .method("POST")
            .path("/folders?name=%20docs%20")
            .reply(&api)
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let folder = body_json(response.body());
        assert_eq!(folder["path"], "/docs/");

        let response = warp::test::request()
            .method("POST")
            .path("/folders?name=")
            .reply(&api)
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = warp::test::request()
            .method("POST")
            .path("/navigate?path=%2Fdocs%2F")
            .reply(&api)
            .await;
        let listing = body_json(response.body());
        assert_eq!(listing["path"], "/docs/");
        assert_eq!(listing["is_empty"], true);

        let response = warp::test::request().path("/breadcrumbs").reply(&api).await;
        let crumbs = body_json(response.body());
        assert_eq!(crumbs[1]["path"], "/docs/");

        let response = warp::test::request()
            .method("POST")
            .path("/navigate/up")
            .reply(&api)
            .await;
        let listing = body_json(response.body());
        assert_eq!(listing["path"], "/");
        assert_eq!(listing["folders"][0]["name"], "docs");

        let id = folder["id"].as_str().unwrap();
        let response = warp::test::request()
            .method("DELETE")
            .path(&format!("/folders/{}", id))
            .reply(&api)
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(state.store.folders().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn progress_is_reported() {
        let api = routes(AppState::new(StoreConfig::default()));
        let response = warp::test::request().path("/progress").reply(&api).await;
        let progress = body_json(response.body());
        assert!(progress["progress"].as_object().unwrap().is_empty());
        assert!(progress["active"].as_object().unwrap().is_empty());
    }

    #[tokio::test]
    async fn version_is_served() {
        let api = routes(AppState::new(StoreConfig::default()));
        let response = warp::test::request().path("/version").reply(&api).await;
        assert_eq!(body_json(response.body()), env!("CARGO_PKG_VERSION"));
    }
}
