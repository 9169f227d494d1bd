use std::io;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tokio::net::ToSocketAddrs;

use crate::cgroup::{self, CgroupContext};

mod models;

type Ctx = Arc<CgroupContext>;

async fn get_mode(State(ctx): State<Ctx>) -> Json<models::ModeResponse> {
    Json(ctx.mode().into())
}

async fn get_containerized(State(ctx): State<Ctx>) -> Json<models::ContainerizedResponse> {
    Json(models::ContainerizedResponse {
        containerized: ctx.containerized(),
    })
}

async fn get_paths(State(ctx): State<Ctx>) -> Json<Vec<models::ControllerPath>> {
    Json(ctx.controller_paths().iter().map(Into::into).collect())
}

#[derive(Debug, serde::Deserialize)]
pub struct ProcsParams {
    pub controller: Option<String>,
}

async fn get_process_count(State(ctx): State<Ctx>, Query(params): Query<ProcsParams>) -> Response {
    let result = tokio::task::spawn_blocking(move || {
        ctx.process_count(params.controller.as_deref())
            .map(|count| models::ProcessCount { count })
    })
    .await
    .expect("spawn_blocking panicked");

    into_json_response(result)
}

async fn get_scalar(State(ctx): State<Ctx>, Path(file): Path<String>) -> Response {
    let result = tokio::task::spawn_blocking(move || {
        ctx.read_scalar(&file).map(|value| models::Scalar {
            file,
            value: value.into(),
        })
    })
    .await
    .expect("spawn_blocking panicked");

    into_json_response(result)
}

async fn get_flat_keyed(State(ctx): State<Ctx>, Path(file): Path<String>) -> Response {
    let result = tokio::task::spawn_blocking(move || {
        ctx.read_flat_keyed(&file).map(|rows| {
            rows.into_iter()
                .map(models::FlatRow::from)
                .collect::<Vec<_>>()
        })
    })
    .await
    .expect("spawn_blocking panicked");

    into_json_response(result)
}

async fn get_nested_keyed(State(ctx): State<Ctx>, Path(file): Path<String>) -> Response {
    let result = tokio::task::spawn_blocking(move || {
        ctx.read_nested_keyed(&file).map(|rows| {
            rows.into_iter()
                .map(models::NestedRow::from)
                .collect::<Vec<_>>()
        })
    })
    .await
    .expect("spawn_blocking panicked");

    into_json_response(result)
}

fn into_json_response<T: serde::Serialize>(result: cgroup::Result<T>) -> Response {
    match result {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(err) => {
            log::error!("metric request failed: {err}");
            (status_for(&err), err.to_string()).into_response()
        }
    }
}

fn status_for(err: &cgroup::Error) -> StatusCode {
    match err {
        cgroup::Error::UnsafeFileName { .. } | cgroup::Error::UnsupportedV1File { .. } => {
            StatusCode::BAD_REQUEST
        }
        cgroup::Error::ControllerNotFound { .. } => StatusCode::NOT_FOUND,
        cgroup::Error::Read(read) if read.kind() == io::ErrorKind::NotFound => {
            StatusCode::NOT_FOUND
        }
        cgroup::Error::Format { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub struct ApiServer {
    router: axum::Router,
}

impl ApiServer {
    pub fn new(ctx: Ctx) -> Self {
        let router = axum::Router::new()
            .route("/cgroup/mode", get(get_mode))
            .route("/cgroup/containerized", get(get_containerized))
            .route("/cgroup/paths", get(get_paths))
            .route("/cgroup/procs", get(get_process_count))
            .route("/cgroup/scalar/{file}", get(get_scalar))
            .route("/cgroup/flat/{file}", get(get_flat_keyed))
            .route("/cgroup/nested/{file}", get(get_nested_keyed))
            .with_state(ctx);
        Self { router }
    }

    pub async fn listen(self, addr: impl ToSocketAddrs) {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .expect("TCP Listener bind");
        axum::serve(listener, self.router.into_make_service())
            .await
            .unwrap()
    }
}
