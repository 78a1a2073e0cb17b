//! Tests for path resolution, listings, classification and caching.

#[cfg(test)]
mod resource_tests {
    use std::fs;
    use std::path::Path;

    use tempfile::TempDir;

    use crate::resource::{
        breadcrumbs, content_type, embedded_asset, content_type_for, extension_of, format_size, is_binary,
        list_entries, negotiate, parse_http_date, DirectoryRenderer, FileIdentity, PathResolver,
        ResolvedTarget,
    };
    use crate::server::{ServerConfig, StatusCode};

    fn served_dir() -> (TempDir, ServerConfig) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "hi").unwrap();
        fs::write(dir.path().join("a b.txt"), "spaced").unwrap();
        fs::create_dir_all(dir.path().join("sub/deeper")).unwrap();
        fs::write(dir.path().join("sub/deeper/notes.md"), "# notes").unwrap();
        let config = ServerConfig::new(dir.path()).unwrap();
        (dir, config)
    }

    /// Undo the HTML escaping of `/` so assertions can use plain URLs.
    fn unescape_slashes(html: &str) -> String {
        html.replace("&#x2f;", "/")
    }

    fn names(entries: &[crate::resource::DirectoryEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_resolve_root_is_directory() {
        let (_dir, config) = served_dir();
        let target = PathResolver::new(&config).resolve("/").await.unwrap();
        assert_eq!(target, ResolvedTarget::Directory(config.root_directory.clone()));
    }

    #[tokio::test]
    async fn test_resolve_file_and_directory() {
        let (_dir, config) = served_dir();
        let resolver = PathResolver::new(&config);

        let target = resolver.resolve("/a.txt").await.unwrap();
        assert_eq!(target, ResolvedTarget::RegularFile(config.root_directory.join("a.txt")));

        let target = resolver.resolve("/sub/deeper/").await.unwrap();
        assert_eq!(target, ResolvedTarget::Directory(config.root_directory.join("sub/deeper")));
    }

    #[tokio::test]
    async fn test_resolve_decodes_percent_escapes() {
        let (_dir, config) = served_dir();
        let target = PathResolver::new(&config).resolve("/a%20b.txt").await.unwrap();
        assert_eq!(target, ResolvedTarget::RegularFile(config.root_directory.join("a b.txt")));
    }

    #[tokio::test]
    async fn test_resolve_missing() {
        let (_dir, config) = served_dir();
        let target = PathResolver::new(&config).resolve("/missing").await.unwrap();
        assert_eq!(target, ResolvedTarget::Missing);

        // Single-page mode leaves the fallback to the handler
        let config = config.with_single_page(true);
        let target = PathResolver::new(&config).resolve("/missing").await.unwrap();
        assert_eq!(target, ResolvedTarget::Missing);
    }

    #[tokio::test]
    async fn test_resolve_rejects_traversal() {
        let (dir, config) = served_dir();
        let outside = dir.path().parent().unwrap().join("outside.txt");
        let _ = fs::write(&outside, "secret");
        let resolver = PathResolver::new(&config);

        for path in ["/../outside.txt", "/%2e%2e/outside.txt", "/sub/../../outside.txt", "/..%2Foutside.txt"] {
            assert_eq!(resolver.resolve(path).await.unwrap(), ResolvedTarget::Missing, "{path}");
        }

        let _ = fs::remove_file(outside);
    }

    #[tokio::test]
    async fn test_resolve_folds_dot_segments_inside_root() {
        let (_dir, config) = served_dir();
        let target = PathResolver::new(&config).resolve("/sub/./deeper/../../a.txt").await.unwrap();
        assert_eq!(target, ResolvedTarget::RegularFile(config.root_directory.join("a.txt")));
    }

    #[tokio::test]
    async fn test_resolve_invalid_utf8_is_missing() {
        let (_dir, config) = served_dir();
        let target = PathResolver::new(&config).resolve("/%ff%fe").await.unwrap();
        assert_eq!(target, ResolvedTarget::Missing);
    }

    #[tokio::test]
    async fn test_resolve_asset_namespace() {
        let (_dir, config) = served_dir();
        let resolver = PathResolver::new(&config);
        let ns = &config.asset_namespace;

        let target = resolver.resolve(&format!("/{ns}/main.css")).await.unwrap();
        assert_eq!(target, ResolvedTarget::AssetFile(embedded_asset("main.css").unwrap()));

        let target = resolver.resolve(&format!("/{ns}/icons/folder.svg")).await.unwrap();
        assert_eq!(target, ResolvedTarget::AssetFile(embedded_asset("icons/folder.svg").unwrap()));

        // Nested below user directories still routes to the assets
        let target = resolver.resolve(&format!("/sub/{ns}/main.css")).await.unwrap();
        assert_eq!(target, ResolvedTarget::AssetFile(embedded_asset("main.css").unwrap()));
    }

    #[tokio::test]
    async fn test_resolve_asset_namespace_edge_cases() {
        let (_dir, config) = served_dir();
        let resolver = PathResolver::new(&config);
        let ns = &config.asset_namespace;

        // The namespace as the last segment is an ordinary (missing) user path
        assert_eq!(resolver.resolve(&format!("/{ns}")).await.unwrap(), ResolvedTarget::Missing);
        assert_eq!(resolver.resolve(&format!("/{ns}/nope.css")).await.unwrap(), ResolvedTarget::Missing);
        assert_eq!(
            resolver.resolve(&format!("/{ns}/../../Cargo.toml")).await.unwrap(),
            ResolvedTarget::Missing
        );
        // Asset directories are never listed
        assert_eq!(resolver.resolve(&format!("/{ns}/icons/")).await.unwrap(), ResolvedTarget::Missing);
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("a.txt"), Some("txt"));
        assert_eq!(extension_of("archive.tar.gz"), Some("gz"));
        assert_eq!(extension_of("Makefile"), None);
        assert_eq!(extension_of(".env"), None);
        assert_eq!(extension_of("trailing."), None);
    }

    #[test]
    fn test_is_binary() {
        assert!(!is_binary("a.txt", b"hi"));
        assert!(!is_binary("README", "héllo wörld".as_bytes()));
        assert!(is_binary("image.png", b"not really a png"));
        assert!(is_binary("data", &[0x00, 0x01, 0x02]));
        assert!(is_binary("blob", &[0xff, 0xfe, 0x41, 0x42]));
        assert!(is_binary("a.txt", b"text\0with nul"));
        assert!(!is_binary("empty", b""));
    }

    #[test]
    fn test_is_binary_ignores_sequence_cut_by_sample() {
        let mut contents = vec![b'a'; 1023];
        contents.extend_from_slice("é".as_bytes());
        assert!(!is_binary("long", &contents));
    }

    #[test]
    fn test_content_type() {
        assert_eq!(content_type("html"), "text/html; charset=utf-8");
        assert_eq!(content_type("txt"), "text/plain; charset=utf-8");
        assert_eq!(content_type("png"), "image/png");
        assert_eq!(content_type("definitely-not-an-ext"), "text/plain; charset=utf-8");
    }

    #[test]
    fn test_content_type_for_unknown_extension_uses_bytes() {
        assert_eq!(content_type_for(Path::new("/x/LICENSE"), b"MIT"), "text/plain; charset=utf-8");
        assert_eq!(content_type_for(Path::new("/x/blob"), &[0, 159, 146, 150]), "application/octet-stream");
        assert_eq!(content_type_for(Path::new("/x/style.css"), b"body{}"), "text/css; charset=utf-8");
    }

    #[test]
    fn test_etag_combines_identity() {
        let identity = FileIdentity::new(66, 1234, 1_600_000_000_123);
        assert_eq!(identity.etag(), "\"66-1234-1600000000123\"");
        assert_eq!(identity.last_modified().as_deref(), Some("Sun, 13 Sep 2020 12:26:40 GMT"));
    }

    #[test]
    fn test_negotiate_headers() {
        let identity = FileIdentity::new(1, 2, 1_600_000_000_000);
        let cache = negotiate(&identity, 60, None);
        assert_eq!(cache.status, StatusCode::Ok);
        assert_eq!(cache.cache_control, "public, max-age=60");

        let headers = cache.headers();
        let names: Vec<&str> = headers.iter().map(|(k, _)| *k).collect();
        assert_eq!(names, vec!["Cache-Control", "Pragma", "ETag", "Last-Modified"]);
        assert_eq!(headers[1].1, "public");
    }

    #[test]
    fn test_negotiate_exact_match_only() {
        let whole_second = FileIdentity::new(1, 2, 1_600_000_000_000);
        let cache = negotiate(&whole_second, 60, Some("Sun, 13 Sep 2020 12:26:40 GMT"));
        assert_eq!(cache.status, StatusCode::NotModified);

        let cache = negotiate(&whole_second, 60, Some("Sun, 13 Sep 2020 12:26:41 GMT"));
        assert_eq!(cache.status, StatusCode::Ok);

        // A second-precision date never matches an mtime with milliseconds
        let with_millis = FileIdentity::new(1, 2, 1_600_000_000_123);
        let cache = negotiate(&with_millis, 60, Some("Sun, 13 Sep 2020 12:26:40 GMT"));
        assert_eq!(cache.status, StatusCode::Ok);

        let cache = negotiate(&with_millis, 60, Some("2020-09-13T12:26:40.123Z"));
        assert_eq!(cache.status, StatusCode::NotModified);

        let cache = negotiate(&with_millis, 60, Some("yesterday"));
        assert_eq!(cache.status, StatusCode::Ok);
    }

    #[test]
    fn test_parse_http_date() {
        assert_eq!(parse_http_date("Sun, 13 Sep 2020 12:26:40 GMT"), Some(1_600_000_000_000));
        assert_eq!(parse_http_date(" 2020-09-13T12:26:40.5Z "), Some(1_600_000_000_500));
        assert_eq!(parse_http_date(""), None);
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(999), "999 B");
        assert_eq!(format_size(4300), "4 KB");
        assert_eq!(format_size(1536), "2 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5 MB");
    }

    #[test]
    fn test_format_size_rounds_before_picking_unit() {
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1_048_575), "1 MB");
        assert_eq!(format_size(1024 * 1024 * 1024 - 1), "1 GB");
        assert_eq!(format_size(1_048_575 - 600), "1023 KB");
    }

    #[test]
    fn test_breadcrumbs_root() {
        let crumbs = breadcrumbs("site", "");
        assert_eq!(crumbs.len(), 1);
        assert_eq!(crumbs[0].name, "site");
        assert_eq!(crumbs[0].url, "/");
    }

    #[test]
    fn test_breadcrumbs_nested() {
        let crumbs = breadcrumbs("site", "docs/api v2/types");
        let pairs: Vec<(&str, &str)> = crumbs.iter().map(|c| (c.name.as_str(), c.url.as_str())).collect();
        assert_eq!(
            pairs,
            vec![
                ("site", "/"),
                ("docs", "/docs/"),
                ("api v2", "/docs/api%20v2/"),
                ("types", "/docs/api%20v2/types/"),
            ]
        );
    }

    #[tokio::test]
    async fn test_list_entries_root() {
        let (dir, config) = served_dir();
        fs::write(dir.path().join(".DS_Store"), [0u8; 4]).unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join("Makefile"), "all:").unwrap();

        let entries = list_entries(&config.root_directory, &config).await.unwrap().unwrap();
        assert_eq!(names(&entries), vec!["sub/", "a b.txt", "a.txt", "Makefile"]);

        let sub = &entries[0];
        assert!(sub.is_directory);
        assert_eq!(sub.relative, "/sub/");
        assert_eq!(sub.size, None);
        assert_eq!(sub.ext, None);

        let spaced = &entries[1];
        assert_eq!(spaced.relative, "/a%20b.txt");

        let plain = &entries[2];
        assert_eq!(plain.size.as_deref(), Some("2 B"));
        assert_eq!(plain.ext.as_deref(), Some("txt"));

        // No extension defaults to txt
        assert_eq!(entries[3].ext.as_deref(), Some("txt"));
    }

    #[tokio::test]
    async fn test_list_entries_respects_configured_ignores() {
        let (dir, config) = served_dir();
        let config = config.with_ignored(["a.txt", "sub/"]);
        fs::write(dir.path().join("keep.txt"), "k").unwrap();

        let entries = list_entries(&config.root_directory, &config).await.unwrap().unwrap();
        assert_eq!(names(&entries), vec!["a b.txt", "keep.txt"]);
    }

    #[tokio::test]
    async fn test_list_entries_parent_links() {
        let (_dir, config) = served_dir();

        let sub = config.root_directory.join("sub");
        let entries = list_entries(&sub, &config).await.unwrap().unwrap();
        assert_eq!(names(&entries), vec!["..", "deeper/"]);
        assert_eq!(entries[0].relative, "/");
        assert_eq!(entries[1].relative, "/sub/deeper/");

        let deeper = config.root_directory.join("sub/deeper");
        let entries = list_entries(&deeper, &config).await.unwrap().unwrap();
        assert_eq!(names(&entries), vec!["..", "notes.md"]);
        assert_eq!(entries[0].relative, "/sub/");
        assert_eq!(entries[1].relative, "/sub/deeper/notes.md");
        assert_eq!(entries[1].ext.as_deref(), Some("md"));
    }

    #[tokio::test]
    async fn test_list_entries_vanished_directory() {
        let (_dir, config) = served_dir();
        let gone = config.root_directory.join("gone");
        assert_eq!(list_entries(&gone, &config).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_render_listing() {
        let (dir, config) = served_dir();
        fs::write(dir.path().join("<b>.txt"), "x").unwrap();
        let renderer = DirectoryRenderer::new().unwrap();

        let deeper = config.root_directory.join("sub/deeper");
        let html = unescape_slashes(&renderer.render(&deeper, &config).await.unwrap().unwrap());
        let root_name = config.root_directory.file_name().unwrap().to_string_lossy().into_owned();

        assert!(html.contains(&format!("/{}/main.css", config.asset_namespace)));
        assert!(html.contains(&format!("Files within {root_name}/sub/deeper")));
        assert!(html.contains("href=\"/sub/deeper/notes.md\""));
        assert!(html.contains("href=\"/sub/\""));
        assert!(html.contains(concat!("dirserve/", env!("CARGO_PKG_VERSION"))));

        let root = unescape_slashes(&renderer.render(&config.root_directory, &config).await.unwrap().unwrap());
        assert!(root.contains("&lt;b&gt;.txt"));
        assert!(!root.contains("<b>.txt"));
        assert!(!root.contains(">..<"));
    }

    #[tokio::test]
    async fn test_render_vanished_directory() {
        let (_dir, config) = served_dir();
        let renderer = DirectoryRenderer::new().unwrap();
        let gone = config.root_directory.join("gone");
        assert!(renderer.render(&gone, &config).await.unwrap().is_none());
    }
}
