use std::fmt::Debug;

/// Resolves stored media paths to URLs and back
pub trait AssetResolver: Debug {
    /// Full URL for a media path
    fn resolve(&self, path: &str) -> String;

    /// Media path for a URL this resolver produced, if it did
    fn relativize(&self, url: &str) -> Option<String>;
}

/// Resolver that prefixes paths with a fixed media base URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaUrlResolver {
    media_url: String,
}

pub const DEFAULT_MEDIA_URL: &str = "/media/";

impl MediaUrlResolver {
    pub fn new(media_url: impl Into<String>) -> Self {
        let mut media_url = media_url.into();
        if !media_url.ends_with('/') {
            media_url.push('/');
        }
        Self { media_url }
    }

    pub fn media_url(&self) -> &str {
        &self.media_url
    }
}

impl Default for MediaUrlResolver {
    fn default() -> Self {
        Self::new(DEFAULT_MEDIA_URL)
    }
}

impl AssetResolver for MediaUrlResolver {
    fn resolve(&self, path: &str) -> String {
        format!("{}{}", self.media_url, path.trim_start_matches('/'))
    }

    fn relativize(&self, url: &str) -> Option<String> {
        url.strip_prefix(&self.media_url).map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_and_relativize() {
        let resolver = MediaUrlResolver::new("https://cdn.example.com/media");
        let url = resolver.resolve("wysiwyg/a.png");
        assert_eq!(url, "https://cdn.example.com/media/wysiwyg/a.png");
        assert_eq!(resolver.relativize(&url).as_deref(), Some("wysiwyg/a.png"));
        assert_eq!(resolver.relativize("https://elsewhere/a.png"), None);
    }
}
