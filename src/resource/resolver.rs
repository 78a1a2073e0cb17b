//! Maps request paths onto the filesystem.

use std::path::PathBuf;

use log::debug;
use percent_encoding::percent_decode_str;
use tokio::fs;

use crate::resource::assets::{embedded_asset, EmbeddedAsset};
use crate::server::{Error, ServerConfig};

/// What a request path points at. Computed fresh for every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedTarget {
    /// A file under the served root.
    RegularFile(PathBuf),
    /// A directory under the served root.
    Directory(PathBuf),
    /// One of the server's own assets, reached through the asset namespace.
    AssetFile(&'static EmbeddedAsset),
    /// Nothing servable at this path.
    Missing,
}

/// Resolves request paths against a [`ServerConfig`].
pub struct PathResolver<'a> {
    config: &'a ServerConfig,
}

impl<'a> PathResolver<'a> {
    pub fn new(config: &'a ServerConfig) -> Self {
        Self { config }
    }

    /// Resolve a still percent-encoded request path.
    ///
    /// Paths that climb out of their base directory, or that do not decode to
    /// UTF-8, resolve to [`ResolvedTarget::Missing`]. In single-page mode a
    /// missing target is still `Missing`; the handler owns the fallback.
    pub async fn resolve(&self, request_path: &str) -> Result<ResolvedTarget, Error> {
        let decoded = match percent_decode_str(request_path).decode_utf8() {
            Ok(decoded) => decoded,
            Err(_) => {
                debug!("request path {request_path} is not valid UTF-8");
                return Ok(ResolvedTarget::Missing);
            }
        };
        let segments: Vec<&str> = decoded.split('/').filter(|s| !s.is_empty()).collect();

        if let Some(relative) = self.asset_segments(&segments) {
            let asset = fold_segments(relative)
                .and_then(|kept| embedded_asset(&kept.join("/")));
            return Ok(asset.map_or(ResolvedTarget::Missing, ResolvedTarget::AssetFile));
        }

        let Some(kept) = fold_segments(&segments) else {
            debug!("request path {request_path} escapes the served directory");
            return Ok(ResolvedTarget::Missing);
        };
        let mut path = self.config.root_directory.clone();
        path.extend(kept);

        match fs::metadata(&path).await {
            Ok(meta) if meta.is_dir() => Ok(ResolvedTarget::Directory(path)),
            Ok(_) => Ok(ResolvedTarget::RegularFile(path)),
            Err(e) => {
                debug!("{path} does not resolve: {e}", path = path.display());
                Ok(ResolvedTarget::Missing)
            }
        }
    }

    /// The segments following the asset namespace, when the namespace appears
    /// in the parent part of the path.
    fn asset_segments<'s>(&self, segments: &'s [&'s str]) -> Option<&'s [&'s str]> {
        let (_, parents) = segments.split_last()?;
        let position = parents
            .iter()
            .position(|segment| *segment == self.config.asset_namespace)?;
        Some(&segments[position + 1..])
    }
}

/// Fold `.` and `..` out of `segments` lexically.
///
/// Returns `None` if a `..` would climb above the first segment or a segment
/// carries a character that could smuggle in another path component.
fn fold_segments<'s>(segments: &[&'s str]) -> Option<Vec<&'s str>> {
    let mut kept: Vec<&str> = Vec::with_capacity(segments.len());
    for segment in segments {
        match *segment {
            "." => {}
            ".." => {
                kept.pop()?;
            }
            s if s.contains('\\') || s.contains('\0') => return None,
            s => kept.push(s),
        }
    }
    Some(kept)
}
