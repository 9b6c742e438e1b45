//! Social platform integrations.

mod error;
mod platform;
mod twitter;

pub use error::SocialError;
pub use platform::{Post, PostId, SocialPlatform};
pub use twitter::{TwitterClient, TwitterCredentials, DEFAULT_BASE_URL};
