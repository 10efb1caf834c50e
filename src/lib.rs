pub mod duration;
pub mod error;
pub mod extension;
pub mod loader;
pub mod models;
mod mutate;
pub mod offset;
pub mod parser;
pub mod query;
pub mod serializer;

pub use duration::Duration;
pub use error::{Result, VastError};
pub use extension::{Extension, ExtensionPayload};
pub use models::{Ad, Vast};
pub use offset::Offset;
pub use parser::parse_vast;
pub use query::VastType;
pub use serializer::serialize_vast;

pub mod async_api {
    use std::time::Duration;

    use crate::error::Result;
    use crate::models::Vast;

    pub async fn parse_vast(xml: &str) -> Result<Vast> {
        // Parsing is CPU-bound, so we can just wrap the sync version
        crate::parser::parse_vast(xml)
    }

    pub async fn load_vast(uri: &str, timeout: Duration) -> Result<Vast> {
        crate::loader::load_uri(uri, timeout).await
    }
}
