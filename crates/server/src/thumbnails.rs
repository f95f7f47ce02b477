//! Thumbnail URL resolution for recommended series.

/// Served when a series has no thumbnail of its own
pub const DEFAULT_THUMBNAIL_URL: &str = "/images/default-thumbnail.png";

/// Turns a stored thumbnail key into a URL a client can load
pub trait ThumbnailResolver: Send + Sync {
    fn url_for(&self, key: &str) -> String;
}

/// Resolves keys against a public base URL (CDN or static bucket)
#[derive(Debug, Clone)]
pub struct PublicUrlResolver {
    base_url: String,
}

impl PublicUrlResolver {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url }
    }
}

impl ThumbnailResolver for PublicUrlResolver {
    fn url_for(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key.trim_start_matches('/'))
    }
}

/// URL for an optional thumbnail key, falling back to [`DEFAULT_THUMBNAIL_URL`]
pub fn resolve_thumbnail(resolver: &dyn ThumbnailResolver, key: Option<&str>) -> String {
    match key {
        Some(key) if !key.is_empty() => resolver.url_for(key),
        _ => DEFAULT_THUMBNAIL_URL.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_url_joins_cleanly() {
        let resolver = PublicUrlResolver::new("https://cdn.example.com/");
        assert_eq!(
            resolver.url_for("/covers/1.png"),
            "https://cdn.example.com/covers/1.png"
        );
    }

    #[test]
    fn test_missing_key_uses_placeholder() {
        let resolver = PublicUrlResolver::new("https://cdn.example.com");
        assert_eq!(resolve_thumbnail(&resolver, None), DEFAULT_THUMBNAIL_URL);
        assert_eq!(resolve_thumbnail(&resolver, Some("")), DEFAULT_THUMBNAIL_URL);
        assert_eq!(
            resolve_thumbnail(&resolver, Some("covers/2.png")),
            "https://cdn.example.com/covers/2.png"
        );
    }
}
