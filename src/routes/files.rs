use super::with_state;
use crate::handlers;
use crate::server::AppState;
use warp::Filter;

const MAX_UPLOAD_BYTES: u64 = 1024 * 1024 * 256;

pub(super) fn routes(
    state: AppState,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    upload(state.clone())
        .or(download(state.clone()))
        .or(remove(state.clone()))
        .or(progress(state))
}

fn upload(state: AppState) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path!("files")
        .and(warp::post())
        .and(warp::multipart::form().max_length(MAX_UPLOAD_BYTES))
        .and(with_state(state))
        .and_then(handlers::upload_files)
}

fn download(state: AppState) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path!("files" / String / "download")
        .and(warp::get())
        .and(with_state(state))
        .and_then(handlers::download_file)
}

fn remove(state: AppState) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path!("files" / String)
        .and(warp::delete())
        .and(with_state(state))
        .and_then(handlers::delete_file)
}

fn progress(state: AppState) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path!("progress")
        .and(warp::get())
        .and(with_state(state))
        .and_then(handlers::get_progress)
}
