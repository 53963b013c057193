//! Registry protocol plugin endpoint handlers

use crate::core::service::{PackageInfoParams, RequestContext};
use crate::core::types::{PluginVersionPackage, PluginVersions};
use crate::http::auth::AuthToken;
use crate::http::errors::HttpResult;
use crate::http::handlers::AppState;
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Debug, Deserialize)]
pub struct PluginPath {
    pub organisation: String,
    pub plugin: String,
}

#[derive(Debug, Deserialize)]
pub struct PackagePath {
    pub organisation: String,
    pub plugin: String,
    pub version: String,
    pub os: String,
    pub arch: String,
}

impl From<PackagePath> for PackageInfoParams {
    fn from(path: PackagePath) -> Self {
        Self {
            organisation: path.organisation,
            plugin: path.plugin,
            version: path.version,
            os: path.os,
            arch: path.arch,
        }
    }
}

/// GET /plugins/:organisation/:plugin/versions
pub async fn list_versions(
    State(state): State<AppState>,
    Extension(AuthToken(token)): Extension<AuthToken>,
    Path(path): Path<PluginPath>,
) -> HttpResult<Json<PluginVersions>> {
    let cancellation = CancellationToken::new();
    // Dropping the handler future, on disconnect or timeout, cancels the request
    let _guard = cancellation.clone().drop_guard();
    let ctx = RequestContext::new(token).with_cancellation(cancellation);

    let versions = state
        .service
        .list_versions(&ctx, &path.organisation, &path.plugin)
        .await?;

    debug!(
        organisation = %path.organisation,
        plugin = %path.plugin,
        versions = versions.versions.len(),
        "Listed plugin versions"
    );
    Ok(Json(versions))
}

/// GET /plugins/:organisation/:plugin/:version/package/:os/:arch
pub async fn get_package(
    State(state): State<AppState>,
    Extension(AuthToken(token)): Extension<AuthToken>,
    Path(path): Path<PackagePath>,
) -> HttpResult<Json<PluginVersionPackage>> {
    let cancellation = CancellationToken::new();
    let _guard = cancellation.clone().drop_guard();
    let ctx = RequestContext::new(token).with_cancellation(cancellation);

    let params = PackageInfoParams::from(path);
    let package = state.service.get_package(&ctx, &params).await?;

    debug!(
        organisation = %params.organisation,
        plugin = %params.plugin,
        version = %params.version,
        filename = %package.filename,
        "Resolved plugin package"
    );
    Ok(Json(package))
}
