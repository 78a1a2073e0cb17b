//! The listing stylesheet and icons, compiled into the binary.

use crate::resource::cache::FileIdentity;

/// A file the server ships with, keyed by its path below the asset namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbeddedAsset {
    pub path: &'static str,
    pub contents: &'static [u8],
}

const ASSETS: &[EmbeddedAsset] = &[
    EmbeddedAsset {
        path: "main.css",
        contents: include_bytes!("../../assets/main.css"),
    },
    EmbeddedAsset {
        path: "icons/folder.svg",
        contents: include_bytes!("../../assets/icons/folder.svg"),
    },
    EmbeddedAsset {
        path: "icons/file.svg",
        contents: include_bytes!("../../assets/icons/file.svg"),
    },
];

/// Look up an asset by its `/`-separated relative path.
pub fn embedded_asset(path: &str) -> Option<&'static EmbeddedAsset> {
    ASSETS.iter().find(|asset| asset.path == path)
}

impl EmbeddedAsset {
    /// Cache identity for this asset. Device 0 never names a real
    /// filesystem and the table position stands in for the inode.
    pub fn identity(&self, modified_ms: i64) -> FileIdentity {
        let inode = ASSETS
            .iter()
            .position(|candidate| candidate.path == self.path)
            .map_or(0, |index| index as u64 + 1);
        FileIdentity::new(0, inode, modified_ms)
    }
}
