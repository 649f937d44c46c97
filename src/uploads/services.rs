use std::path::{Component, Path, PathBuf};

use anyhow::Context;
use rand::Rng;
use time::OffsetDateTime;
use tracing::warn;

pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

const ALLOWED_EXTENSIONS: [&str; 5] = ["jpeg", "jpg", "png", "gif", "webp"];

/// Lowercased extension of a filename, without the dot.
pub fn extension_of(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

pub fn extension_allowed(ext: &str) -> bool {
    ALLOWED_EXTENSIONS.contains(&ext)
}

/// Declared content type must be an image type on the same allow-list.
pub fn content_type_allowed(content_type: &str) -> bool {
    matches!(
        content_type,
        "image/jpeg" | "image/jpg" | "image/png" | "image/gif" | "image/webp"
    )
}

pub fn content_type_for_extension(ext: &str) -> &'static str {
    match ext {
        "jpeg" | "jpg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

/// Unique filename: `image_<millis>-<random>.<ext>`.
pub fn make_filename(ext: &str) -> String {
    let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
    format!("image_{millis}-{suffix}.{ext}")
}

/// Relative storage key under the uploads root. The per-owner/per-product
/// nesting keeps one admin's uploads from colliding with another's.
pub fn storage_key(owner_id: i64, product_id: i64, filename: &str) -> String {
    format!("u{owner_id}/p{product_id}/{filename}")
}

/// Lexical check of a client-supplied relative path: only plain path
/// segments, no `..`, no absolute components.
pub fn sanitize_relative(rel: &str) -> Option<PathBuf> {
    let path = Path::new(rel);
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(seg) => out.push(seg),
            Component::CurDir => {}
            _ => return None,
        }
    }
    if out.as_os_str().is_empty() {
        None
    } else {
        Some(out)
    }
}

/// Canonicalization check that `candidate` (which must exist) resolves under
/// `root`. The sole traversal defense beyond the lexical sanitization above.
pub fn resolves_under_root(root: &Path, candidate: &Path) -> anyhow::Result<bool> {
    let root = root
        .canonicalize()
        .with_context(|| format!("canonicalize upload root {}", root.display()))?;
    let candidate = candidate
        .canonicalize()
        .with_context(|| format!("canonicalize {}", candidate.display()))?;
    Ok(candidate.starts_with(&root))
}

/// Write file bytes under `<root>/<key>`, creating directories as needed.
pub async fn store_file(root: &Path, key: &str, bytes: &[u8]) -> anyhow::Result<PathBuf> {
    let full = root.join(key);
    if let Some(parent) = full.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("create dir {}", parent.display()))?;
    }
    tokio::fs::write(&full, bytes)
        .await
        .with_context(|| format!("write {}", full.display()))?;
    Ok(full)
}

/// Best-effort compensating delete after a later step failed.
pub async fn remove_file(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        warn!(error = %e, path = %path.display(), "compensating delete failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_allow_list() {
        for ok in ["jpeg", "jpg", "png", "gif", "webp"] {
            assert!(extension_allowed(ok), "{ok} should be allowed");
        }
        for bad in ["exe", "svg", "pdf", "sh", ""] {
            assert!(!extension_allowed(bad), "{bad} should be rejected");
        }
    }

    #[test]
    fn extension_of_lowercases_and_strips() {
        assert_eq!(extension_of("cat.PNG").as_deref(), Some("png"));
        assert_eq!(extension_of("archive.tar.gz").as_deref(), Some("gz"));
        assert_eq!(extension_of("noext"), None);
    }

    #[test]
    fn content_type_allow_list() {
        assert!(content_type_allowed("image/png"));
        assert!(content_type_allowed("image/webp"));
        assert!(!content_type_allowed("application/octet-stream"));
        assert!(!content_type_allowed("text/html"));
    }

    #[test]
    fn filename_shape() {
        let name = make_filename("png");
        let re = regex::Regex::new(r"^image_\d+-\d+\.png$").unwrap();
        assert!(re.is_match(&name), "unexpected filename {name}");
    }

    #[test]
    fn storage_key_nests_by_owner_and_product() {
        assert_eq!(storage_key(7, 42, "image_1-2.png"), "u7/p42/image_1-2.png");
    }

    #[test]
    fn sanitize_rejects_traversal() {
        assert!(sanitize_relative("../etc/passwd").is_none());
        assert!(sanitize_relative("u7/../../secret").is_none());
        assert!(sanitize_relative("/etc/passwd").is_none());
        assert!(sanitize_relative("").is_none());
    }

    #[test]
    fn sanitize_accepts_plain_keys() {
        assert_eq!(
            sanitize_relative("u7/p42/image_1-2.png"),
            Some(PathBuf::from("u7/p42/image_1-2.png"))
        );
        assert_eq!(
            sanitize_relative("./u7/p42/a.png"),
            Some(PathBuf::from("u7/p42/a.png"))
        );
    }

    #[tokio::test]
    async fn store_and_containment_roundtrip() {
        let root = std::env::temp_dir().join(format!("shopcore-test-{}", make_filename("d")));
        tokio::fs::create_dir_all(&root).await.unwrap();

        let key = storage_key(7, 42, "image_1-2.png");
        let written = store_file(&root, &key, b"png-bytes").await.unwrap();
        assert!(written.ends_with("u7/p42/image_1-2.png"));
        assert!(resolves_under_root(&root, &written).unwrap());

        let outside = std::env::temp_dir().join("shopcore-outside.png");
        tokio::fs::write(&outside, b"x").await.unwrap();
        assert!(!resolves_under_root(&root, &outside).unwrap());

        tokio::fs::remove_file(&outside).await.ok();
        tokio::fs::remove_dir_all(&root).await.ok();
    }
}
