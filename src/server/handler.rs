//! Per-request orchestration.
//!
//! Every request goes through [`RequestHandler::handle`]: resolve the path,
//! then take the first applicable branch:
//!
//! 1. an asset or regular file is served with cache negotiation,
//! 2. a missing target is a 404 (or the SPA shell in single-page mode),
//! 3. a directory serves its `index.html`, else a listing, else falls back
//!    like a missing target.

use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use log::debug;
use tokio::fs;

use crate::parser::HttpRequest;
use crate::resource::{
    self, DirectoryRenderer, EmbeddedAsset, FileIdentity, PathResolver, ResolvedTarget,
};
use crate::server::config::ServerConfig;
use crate::server::error::Error;
use crate::server::response::{HttpResponse, StatusCode};

const INDEX_FILE: &str = "index.html";
const NOT_FOUND_FILE: &str = "404.html";

/// Builds the response for a single request. Shared read-only between
/// connection tasks.
pub struct RequestHandler {
    config: Arc<ServerConfig>,
    renderer: DirectoryRenderer,
    /// Whole-second start time, used as the mtime of the embedded assets.
    assets_modified_ms: i64,
}

impl RequestHandler {
    pub fn new(config: Arc<ServerConfig>) -> Result<Self, Error> {
        Ok(Self {
            config,
            renderer: DirectoryRenderer::new()?,
            assets_modified_ms: Utc::now().timestamp() * 1000,
        })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Produce the response for `request`. Errors are unexpected I/O or
    /// template failures; absence is always an ordinary 404 response.
    pub async fn handle(&self, request: &HttpRequest) -> Result<HttpResponse, Error> {
        let target = PathResolver::new(&self.config).resolve(&request.path).await?;
        debug!("{path} resolved to {target:?}", path = request.path);

        match target {
            ResolvedTarget::RegularFile(path) => self.serve_file(&path, request).await,
            ResolvedTarget::AssetFile(asset) => Ok(self.serve_asset(asset, request)),
            ResolvedTarget::Directory(dir) => self.serve_directory(&dir).await,
            ResolvedTarget::Missing if self.config.single_page => self.serve_spa_shell().await,
            ResolvedTarget::Missing => self.not_found().await,
        }
    }

    async fn serve_directory(&self, dir: &Path) -> Result<HttpResponse, Error> {
        let index = dir.join(INDEX_FILE);
        if let Some(contents) = read_if_file(&index).await? {
            return Ok(HttpResponse::new(StatusCode::Ok)
                .with_content_type(resource::content_type("html"))
                .with_body_bytes(contents));
        }

        if let Some(html) = self.renderer.render(dir, &self.config).await? {
            return Ok(HttpResponse::new(StatusCode::Ok)
                .with_content_type("text/html; charset=utf-8")
                .with_body_string(html));
        }

        if self.config.single_page {
            self.serve_spa_shell().await
        } else {
            self.not_found().await
        }
    }

    /// The root `index.html`, served for anything unresolvable in
    /// single-page mode. Without one the request is a plain 404.
    async fn serve_spa_shell(&self) -> Result<HttpResponse, Error> {
        let index = self.config.root_directory.join(INDEX_FILE);
        match read_if_file(&index).await? {
            Some(contents) => Ok(HttpResponse::new(StatusCode::Ok)
                .with_content_type(resource::content_type("html"))
                .with_body_bytes(contents)),
            None => self.not_found().await,
        }
    }

    async fn serve_file(&self, path: &Path, request: &HttpRequest) -> Result<HttpResponse, Error> {
        // The file may have gone since it was resolved
        let metadata = match fs::metadata(path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => return self.not_found().await,
            Err(e) => return Err(e.into()),
        };
        let contents = match fs::read(path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return self.not_found().await,
            Err(e) => return Err(e.into()),
        };

        let identity = FileIdentity::from_metadata(&metadata)?;
        let content_type = resource::content_type_for(path, &contents);
        Ok(self.negotiated(&identity, content_type, contents, request))
    }

    fn serve_asset(&self, asset: &EmbeddedAsset, request: &HttpRequest) -> HttpResponse {
        let identity = asset.identity(self.assets_modified_ms);
        let content_type = resource::content_type_for(Path::new(asset.path), asset.contents);
        self.negotiated(&identity, content_type, asset.contents.to_vec(), request)
    }

    /// 200 with `contents`, or an empty 304, carrying the cache headers.
    fn negotiated(
        &self,
        identity: &FileIdentity,
        content_type: String,
        contents: Vec<u8>,
        request: &HttpRequest,
    ) -> HttpResponse {
        let cache = resource::negotiate(identity, self.config.cache_seconds, request.if_modified_since());

        let mut response = HttpResponse::new(cache.status).with_content_type(content_type);
        for (name, value) in cache.headers() {
            response.set_header(name, value);
        }

        if cache.status == StatusCode::NotModified {
            return response;
        }
        response.with_body_bytes(contents)
    }

    /// 404 with the root `404.html` as body when there is one.
    async fn not_found(&self) -> Result<HttpResponse, Error> {
        let custom = self.config.root_directory.join(NOT_FOUND_FILE);
        match read_if_file(&custom).await? {
            Some(contents) => Ok(HttpResponse::new(StatusCode::NotFound)
                .with_content_type(resource::content_type("html"))
                .with_body_bytes(contents)),
            None => Ok(HttpResponse::text(StatusCode::NotFound, "Not Found")),
        }
    }
}

/// Read `path` if it is a regular file; `None` if absent or not a file.
async fn read_if_file(path: &Path) -> Result<Option<Vec<u8>>, Error> {
    match fs::metadata(path).await {
        Ok(metadata) if metadata.is_file() => {}
        Ok(_) => return Ok(None),
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    }

    match fs::read(path).await {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}
