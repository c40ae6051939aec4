pub mod api;
pub mod auth;
pub mod store;
pub mod stream;

pub use api::{ApiClient, ApiError};
pub use auth::{auth_header, AuthMode, AuthProfile};
pub use store::{CredentialStore, StoreError};
pub use stream::{LogStreamController, StreamError, StreamEvent};
