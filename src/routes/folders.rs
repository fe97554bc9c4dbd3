use super::with_state;
use crate::handlers;
use crate::server::AppState;
use std::collections::HashMap;
use warp::Filter;

pub(super) fn routes(
    state: AppState,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    listing(state.clone())
        .or(breadcrumbs(state.clone()))
        .or(create(state.clone()))
        .or(remove(state.clone()))
        .or(navigate_up(state.clone()))
        .or(navigate(state))
}

fn listing(state: AppState) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path!("listing")
        .and(warp::get())
        .and(with_state(state))
        .and_then(handlers::get_listing)
}

fn breadcrumbs(state: AppState) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path!("breadcrumbs")
        .and(warp::get())
        .and(with_state(state))
        .and_then(handlers::get_breadcrumbs)
}

fn create(state: AppState) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path!("folders")
        .and(warp::post())
        .and(warp::query::<HashMap<String, String>>())
        .and(with_state(state))
        .and_then(handlers::create_folder)
}

fn remove(state: AppState) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path!("folders" / String)
        .and(warp::delete())
        .and(with_state(state))
        .and_then(handlers::delete_folder)
}

fn navigate_up(state: AppState) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path!("navigate" / "up")
        .and(warp::post())
        .and(with_state(state))
        .and_then(handlers::navigate_up)
}

fn navigate(state: AppState) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path!("navigate")
        .and(warp::post())
        .and(warp::query::<HashMap<String, String>>())
        .and(with_state(state))
        .and_then(handlers::navigate)
}
