use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters `encodeURIComponent` leaves untouched, so proxies that expect
/// browser-style encoding decode the feed URL the same way.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub const DEFAULT_FEED_BASE_URL: &str = "https://medium.com/feed";
pub const DEFAULT_PROFILE_BASE_URL: &str = "https://medium.com";
pub const DEFAULT_PROXY_URL: &str = "https://api.allorigins.win/raw?url=";

/// Where feeds live and how they are reached.
///
/// Owner ids passed in here are bare handles (no leading `@`); see
/// [`crate::util::validate_owner_id`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEndpoints {
    pub feed_base_url: String,
    pub profile_base_url: String,
    /// Prefix the percent-encoded feed URL is appended to
    pub proxy_url: String,
}

impl Default for FeedEndpoints {
    fn default() -> Self {
        Self {
            feed_base_url: DEFAULT_FEED_BASE_URL.to_string(),
            profile_base_url: DEFAULT_PROFILE_BASE_URL.to_string(),
            proxy_url: DEFAULT_PROXY_URL.to_string(),
        }
    }
}

impl FeedEndpoints {
    /// `<feed_base_url>/@<handle>`
    pub fn feed_url(&self, handle: &str) -> String {
        format!("{}/@{}", self.feed_base_url.trim_end_matches('/'), handle)
    }

    /// The feed URL, percent-encoded and appended to the proxy endpoint.
    pub fn proxied_feed_url(&self, handle: &str) -> String {
        let feed_url = self.feed_url(handle);
        format!(
            "{}{}",
            self.proxy_url,
            utf8_percent_encode(&feed_url, URI_COMPONENT)
        )
    }

    /// `<profile_base_url>/@<handle>`
    pub fn profile_url(&self, handle: &str) -> String {
        format!("{}/@{}", self.profile_base_url.trim_end_matches('/'), handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_urls() {
        let endpoints = FeedEndpoints::default();
        assert_eq!(endpoints.feed_url("writer"), "https://medium.com/feed/@writer");
        assert_eq!(endpoints.profile_url("writer"), "https://medium.com/@writer");
        assert_eq!(
            endpoints.proxied_feed_url("writer"),
            "https://api.allorigins.win/raw?url=https%3A%2F%2Fmedium.com%2Ffeed%2F%40writer"
        );
    }

    #[test]
    fn test_uri_component_safe_chars_untouched() {
        let endpoints = FeedEndpoints {
            proxy_url: "https://proxy.example/?u=".to_string(),
            ..FeedEndpoints::default()
        };
        assert_eq!(
            endpoints.proxied_feed_url("jane.doe_1-x"),
            "https://proxy.example/?u=https%3A%2F%2Fmedium.com%2Ffeed%2F%40jane.doe_1-x"
        );
    }

    #[test]
    fn test_trailing_slash_on_base_ignored() {
        let endpoints = FeedEndpoints {
            feed_base_url: "https://medium.com/feed/".to_string(),
            profile_base_url: "https://medium.com/".to_string(),
            ..FeedEndpoints::default()
        };
        assert_eq!(endpoints.feed_url("w"), "https://medium.com/feed/@w");
        assert_eq!(endpoints.profile_url("w"), "https://medium.com/@w");
    }
}
