//! Client core for the social forum: the identity store, the REST API
//! binding, and the browser glue around them.

pub mod api;
pub mod config;
pub mod error;
pub mod identity;
pub mod models;
pub mod storage;
pub mod transport;
pub mod wire;

#[cfg(target_arch = "wasm32")]
pub mod console;
#[cfg(target_arch = "wasm32")]
pub mod dom;

pub use api::ApiClient;
pub use config::ClientConfig;
pub use error::{ApiError, StorageError, TransportError};
pub use identity::{IdentityStore, Subscription};
pub use models::{
    Comment, ContentRequest, HealthStatus, Identity, LikeRequest, LikeResponse, Post,
};
pub use storage::{KeyValueStorage, MemoryStorage};
pub use transport::{ApiRequest, ApiResponse, Method, ReqwestTransport, Transport};

pub const USERNAME_LOCAL_STORAGE_KEY: &str = "user";
pub const USERNAME_HEADER: &str = "x-username";
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console, js_name = log)]
    pub fn console_log(contents: &str);
}

/// Installs the panic hook and routes `log` records to the browser console.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn bootstrap() {
    std::panic::set_hook(Box::new(console_error_panic_hook::hook));
    console::init(log::LevelFilter::Info);
}
