use crate::url::{PagePath, Reference};
use crate::UrlError;
use url::Url;

/// The immutable crawl root: scheme plus authority
///
/// The authority is kept exactly as written in the root URL (case and port
/// included) because links are matched against it verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    scheme: String,
    netloc: String,
}

impl Target {
    /// Parses the crawl root
    ///
    /// Only `http` and `https` roots with a host are accepted. Any path, query
    /// or fragment on the root is ignored; the crawl always starts at `/`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tidemark::url::Target;
    ///
    /// let target = Target::parse("http://localhost:8000/").unwrap();
    /// assert_eq!(target.netloc(), "localhost:8000");
    /// assert_eq!(target.origin(), "http://localhost:8000");
    /// ```
    pub fn parse(root: &str) -> Result<Self, UrlError> {
        let url = Url::parse(root.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(UrlError::InvalidScheme(format!(
                "Only HTTP and HTTPS schemes are supported, got: {}",
                url.scheme()
            )));
        }

        if url.host_str().is_none() {
            return Err(UrlError::MissingHost);
        }

        let netloc = Reference::split(root)
            .netloc
            .ok_or(UrlError::MissingHost)?
            .to_string();

        Ok(Self {
            scheme: url.scheme().to_string(),
            netloc,
        })
    }

    /// The authority links must match to stay in the crawl
    pub fn netloc(&self) -> &str {
        &self.netloc
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// `scheme://authority`, without a trailing slash
    pub fn origin(&self) -> String {
        format!("{}://{}", self.scheme, self.netloc)
    }

    /// Absolute URL of a page on this target
    pub fn url_for(&self, page: &PagePath) -> String {
        format!("{}{}", self.origin(), page)
    }
}
