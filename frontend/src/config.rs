use crate::{DEFAULT_API_URL, USERNAME_LOCAL_STORAGE_KEY};

/// Where the REST API lives and where the identity is kept.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub storage_key: String,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        ClientConfig {
            base_url: base_url.into(),
            storage_key: USERNAME_LOCAL_STORAGE_KEY.to_owned(),
        }
    }

    pub fn with_storage_key(mut self, storage_key: impl Into<String>) -> Self {
        self.storage_key = storage_key.into();
        self
    }

    /// Config pointing at the origin the page was served from.
    #[cfg(target_arch = "wasm32")]
    pub fn from_page_origin() -> Self {
        let origin = web_sys::window()
            .and_then(|window| window.location().origin().ok())
            .unwrap_or_else(|| DEFAULT_API_URL.to_owned());

        ClientConfig::new(origin)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig::new(DEFAULT_API_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_local_server_and_user_key() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.storage_key, "user");
    }

    #[test]
    fn storage_key_can_be_overridden() {
        let config = ClientConfig::new("http://forum.test").with_storage_key("forum_user");
        assert_eq!(config.base_url, "http://forum.test");
        assert_eq!(config.storage_key, "forum_user");
    }
}
