//! ETag, Cache-Control and `If-Modified-Since` handling.

use std::fs::Metadata;
use std::io;

use chrono::{DateTime, Utc};

use crate::server::StatusCode;

/// The stable identity of a file version: device, inode and mtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileIdentity {
    pub device: u64,
    pub inode: u64,
    /// Modification time in milliseconds since the Unix epoch.
    pub modified_ms: i64,
}

impl FileIdentity {
    pub fn new(device: u64, inode: u64, modified_ms: i64) -> Self {
        Self {
            device,
            inode,
            modified_ms,
        }
    }

    #[cfg(unix)]
    pub fn from_metadata(metadata: &Metadata) -> io::Result<Self> {
        use std::os::unix::fs::MetadataExt;

        let modified: DateTime<Utc> = metadata.modified()?.into();
        Ok(Self::new(metadata.dev(), metadata.ino(), modified.timestamp_millis()))
    }

    /// Without inodes the file length stands in for the inode number.
    #[cfg(not(unix))]
    pub fn from_metadata(metadata: &Metadata) -> io::Result<Self> {
        let modified: DateTime<Utc> = metadata.modified()?.into();
        Ok(Self::new(0, metadata.len(), modified.timestamp_millis()))
    }

    pub fn etag(&self) -> String {
        format!("\"{}-{}-{}\"", self.device, self.inode, self.modified_ms)
    }

    /// The mtime as an IMF-fixdate, or `None` if it is out of range.
    pub fn last_modified(&self) -> Option<String> {
        DateTime::<Utc>::from_timestamp_millis(self.modified_ms)
            .map(|time| time.format("%a, %d %b %Y %H:%M:%S GMT").to_string())
    }
}

/// Cache headers and the status decided for one file response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheMetadata {
    pub etag: String,
    pub cache_control: String,
    pub last_modified: Option<String>,
    pub status: StatusCode,
}

impl CacheMetadata {
    /// Headers to attach, in the order they are sent.
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        let mut headers = vec![
            ("Cache-Control", self.cache_control.clone()),
            ("Pragma", "public".to_string()),
            ("ETag", self.etag.clone()),
        ];
        if let Some(last_modified) = &self.last_modified {
            headers.push(("Last-Modified", last_modified.clone()));
        }
        headers
    }
}

/// Decide between 200 and 304.
///
/// 304 only when `If-Modified-Since` parses and names exactly the file's
/// mtime, to the millisecond. There is no weak or range comparison.
pub fn negotiate(identity: &FileIdentity, cache_seconds: u64, if_modified_since: Option<&str>) -> CacheMetadata {
    let not_modified = if_modified_since
        .and_then(parse_http_date)
        .is_some_and(|since| since == identity.modified_ms);

    CacheMetadata {
        etag: identity.etag(),
        cache_control: format!("public, max-age={cache_seconds}"),
        last_modified: identity.last_modified(),
        status: if not_modified {
            StatusCode::NotModified
        } else {
            StatusCode::Ok
        },
    }
}

/// Parse an HTTP date to milliseconds since the epoch.
///
/// Accepts IMF-fixdate (`Wed, 21 Oct 2015 07:28:00 GMT`) and RFC 3339,
/// which can carry milliseconds.
pub fn parse_http_date(value: &str) -> Option<i64> {
    let value = value.trim();
    DateTime::parse_from_rfc2822(value)
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .ok()
        .map(|time| time.timestamp_millis())
}
