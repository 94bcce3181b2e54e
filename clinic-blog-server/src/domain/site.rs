use anyhow::{Context, Result, anyhow};
use reqwest::Url;

use super::content::is_url_safe_slug;
use super::error::AssemblyError;

/// Public identity of the site: canonical origin, display name, social handle.
#[derive(Debug, Clone)]
pub(crate) struct SiteConfig {
    base: Url,
    pub(crate) name: String,
    pub(crate) twitter_handle: Option<String>,
}

impl SiteConfig {
    pub(crate) fn new(
        base_url: &str,
        name: impl Into<String>,
        twitter_handle: Option<String>,
    ) -> Result<Self> {
        let mut base = Url::parse(base_url.trim())
            .with_context(|| format!("invalid site url '{base_url}'"))?;
        if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
            return Err(anyhow!("site url must be an absolute http(s) url"));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.set_query(None);
        base.set_fragment(None);

        Ok(Self {
            base,
            name: name.into(),
            twitter_handle,
        })
    }

    /// Origin without the trailing slash, as used in `Host:` lines.
    pub(crate) fn origin(&self) -> String {
        self.base.as_str().trim_end_matches('/').to_string()
    }

    pub(crate) fn home(&self) -> Url {
        self.base.clone()
    }

    /// Absolute url for a site-relative path such as `/blog` or `blog/x`.
    pub(crate) fn url_for(&self, path: &str) -> Result<Url, AssemblyError> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|err| AssemblyError::invalid("path", err.to_string()))
    }

    pub(crate) fn post_url(&self, slug: &str) -> Result<Url, AssemblyError> {
        self.url_for(&format!("blog/{}", checked_slug(slug)?))
    }

    pub(crate) fn category_url(&self, slug: &str) -> Result<Url, AssemblyError> {
        self.url_for(&format!("blog/category/{}", checked_slug(slug)?))
    }

    /// `url_for(path)` with the given query pairs; no `?` when `pairs` is empty.
    pub(crate) fn url_with_query(
        &self,
        path: &str,
        pairs: &[(&str, String)],
    ) -> Result<Url, AssemblyError> {
        let mut url = self.url_for(path)?;
        if !pairs.is_empty() {
            let mut query = url.query_pairs_mut();
            for (key, value) in pairs {
                query.append_pair(key, value);
            }
        }
        Ok(url)
    }
}

fn checked_slug(slug: &str) -> Result<&str, AssemblyError> {
    if is_url_safe_slug(slug) {
        Ok(slug)
    } else {
        Err(AssemblyError::invalid("slug", format!("'{slug}' is not url-safe")))
    }
}

#[cfg(test)]
mod tests {
    use super::SiteConfig;

    fn site() -> SiteConfig {
        SiteConfig::new("https://www.aideamed.com", "Aidea:Med", None).expect("valid site")
    }

    #[test]
    fn post_url_is_absolute() {
        let url = site().post_url("dental-seo").expect("valid url");
        assert_eq!(url.as_str(), "https://www.aideamed.com/blog/dental-seo");
    }

    #[test]
    fn non_ascii_slug_is_percent_encoded() {
        let url = site().post_url("牙醫").expect("valid url");
        assert_eq!(url.as_str(), "https://www.aideamed.com/blog/%E7%89%99%E9%86%AB");
    }

    #[test]
    fn base_path_is_preserved() {
        let site = SiteConfig::new("https://example.com/site", "x", None).expect("valid site");
        let url = site.url_for("/blog").expect("valid url");
        assert_eq!(url.as_str(), "https://example.com/site/blog");
        assert_eq!(site.origin(), "https://example.com/site");
    }

    #[test]
    fn query_pairs_are_encoded() {
        let url = site()
            .url_with_query("/blog", &[("search", "a&b c".to_string())])
            .expect("valid url");
        assert_eq!(url.as_str(), "https://www.aideamed.com/blog?search=a%26b+c");

        let url = site().url_with_query("/blog", &[]).expect("valid url");
        assert_eq!(url.as_str(), "https://www.aideamed.com/blog");
    }

    #[test]
    fn unsafe_slug_is_rejected() {
        assert!(site().post_url("a/b").is_err());
        assert!(site().category_url("..").is_err());
    }

    #[test]
    fn rejects_relative_url() {
        assert!(SiteConfig::new("/relative", "x", None).is_err());
        assert!(SiteConfig::new("ftp://example.com", "x", None).is_err());
    }
}
