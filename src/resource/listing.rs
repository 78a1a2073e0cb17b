//! HTML directory listings.

use std::path::Path;

use log::debug;
use minijinja::Environment;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::Serialize;
use tokio::fs;

use crate::resource::classify::extension_of;
use crate::server::{Error, ServerConfig};

const TEMPLATE_NAME: &str = "directory.html";

/// Characters escaped when a file name becomes one URL path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

const SERVER_VERSION: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// One row of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryEntry {
    /// Display name; directories end with `/`.
    pub name: String,
    /// Absolute URL path of the entry.
    pub relative: String,
    pub is_directory: bool,
    /// Human readable size, files only.
    pub size: Option<String>,
    /// Extension, files only. `txt` when the name has none.
    pub ext: Option<String>,
}

/// One step of the navigation trail above a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Breadcrumb {
    pub name: String,
    pub url: String,
}

#[derive(Serialize)]
struct ListingContext<'a> {
    port: u16,
    files: &'a [DirectoryEntry],
    asset_dir: &'a str,
    directory: &'a str,
    server_version: &'a str,
    paths: &'a [Breadcrumb],
}

/// Renders directory listings from the built-in template.
pub struct DirectoryRenderer {
    env: Environment<'static>,
}

impl DirectoryRenderer {
    pub fn new() -> Result<Self, Error> {
        let mut env = Environment::new();
        env.add_template(TEMPLATE_NAME, include_str!("../../assets/directory.html"))?;
        Ok(Self { env })
    }

    /// Render the listing for `dir`, or `None` if it vanished before it
    /// could be read.
    pub async fn render(&self, dir: &Path, config: &ServerConfig) -> Result<Option<String>, Error> {
        let Some(files) = list_entries(dir, config).await? else {
            return Ok(None);
        };

        let sub_path = sub_path(dir, &config.root_directory)?;
        let root_name = root_name(&config.root_directory);
        let directory = if sub_path.is_empty() {
            root_name.clone()
        } else {
            format!("{root_name}/{sub_path}")
        };
        let paths = breadcrumbs(&root_name, &sub_path);

        let context = ListingContext {
            port: config.port,
            files: &files,
            asset_dir: &config.asset_namespace,
            directory: &directory,
            server_version: SERVER_VERSION,
            paths: &paths,
        };
        let html = self.env.get_template(TEMPLATE_NAME)?.render(context)?;
        Ok(Some(html))
    }
}

/// The visible children of `dir`: ignored names removed, directories first,
/// and a `..` entry on top unless `dir` is the served root.
pub async fn list_entries(dir: &Path, config: &ServerConfig) -> Result<Option<Vec<DirectoryEntry>>, Error> {
    let mut read_dir = match fs::read_dir(dir).await {
        Ok(read_dir) => read_dir,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("{dir} vanished before listing", dir = dir.display());
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    let sub_path = sub_path(dir, &config.root_directory)?;
    let base_url = if sub_path.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", encode_path(&sub_path))
    };

    let mut entries = Vec::new();
    while let Some(child) = read_dir.next_entry().await? {
        let name = child.file_name().to_string_lossy().into_owned();
        let metadata = match fs::metadata(child.path()).await {
            Ok(metadata) => metadata,
            // Dangling symlink, or deleted since readdir
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => return Err(e.into()),
        };

        let encoded = utf8_percent_encode(&name, SEGMENT).to_string();
        let entry = if metadata.is_dir() {
            DirectoryEntry {
                name: format!("{name}/"),
                relative: format!("{base_url}{encoded}/"),
                is_directory: true,
                size: None,
                ext: None,
            }
        } else {
            DirectoryEntry {
                ext: Some(extension_of(&name).unwrap_or("txt").to_string()),
                relative: format!("{base_url}{encoded}"),
                name,
                is_directory: false,
                size: Some(format_size(metadata.len())),
            }
        };

        if config.is_ignored(&entry.name) {
            continue;
        }
        entries.push(entry);
    }

    entries.sort_by(|a, b| {
        b.is_directory
            .cmp(&a.is_directory)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });

    if !sub_path.is_empty() {
        let parent = match sub_path.rsplit_once('/') {
            Some((parent, _)) => format!("/{}/", encode_path(parent)),
            None => "/".to_string(),
        };
        entries.insert(
            0,
            DirectoryEntry {
                name: "..".to_string(),
                relative: parent,
                is_directory: true,
                size: None,
                ext: None,
            },
        );
    }

    Ok(Some(entries))
}

/// Navigation trail for a listing: the root first, then one crumb per
/// directory below it, each linking to that directory.
pub fn breadcrumbs(root_name: &str, sub_path: &str) -> Vec<Breadcrumb> {
    let mut crumbs = vec![Breadcrumb {
        name: root_name.to_string(),
        url: "/".to_string(),
    }];

    let mut url = String::from("/");
    for component in sub_path.split('/').filter(|c| !c.is_empty()) {
        url.push_str(&utf8_percent_encode(component, SEGMENT).to_string());
        url.push('/');
        crumbs.push(Breadcrumb {
            name: component.to_string(),
            url: url.clone(),
        });
    }

    crumbs
}

/// Byte count in binary units, rounded to a whole number: `4 KB`.
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB", "PB"];

    let mut size = bytes as f64;
    let mut unit = 0;
    // Compare the rounded value so 1023.9 KB moves up to 1 MB
    while size.round() >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    format!("{} {}", size.round() as u64, UNITS[unit])
}

/// `dir` relative to `root`, `/`-separated, empty for the root itself.
fn sub_path(dir: &Path, root: &Path) -> Result<String, Error> {
    let relative = dir.strip_prefix(root).map_err(|_| {
        Error::InternalError(format!("{} is outside the served directory", dir.display()))
    })?;

    Ok(relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/"))
}

fn root_name(root: &Path) -> String {
    root.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "/".to_string())
}

fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| utf8_percent_encode(segment, SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}
