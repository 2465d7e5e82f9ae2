//! Client-side localization and session-state subsystem for the Praska
//! laundry portal.
//!
//! The portal frontend is a thin presentation layer over a remote JSON API;
//! this crate owns the one piece with real moving parts: which language is
//! active, where the localized content comes from, and how everything else
//! finds out about changes.
//!
//! - [`session::LanguageSession`] holds the active language and the fetched
//!   [`bundle::LanguageBundle`], publishing snapshots over a watch channel.
//! - [`store::PreferenceStore`] persists the language choice and cached
//!   payloads across restarts.
//! - [`endpoint_cache::EndpointLoader`] serves per-endpoint localized
//!   payloads cache-first under composite `{endpoint}_{language}` keys.
//! - [`url_prefix`] keeps the address path's two-letter language prefix in
//!   step with the session.

pub mod bundle;
pub mod config;
pub mod endpoint_cache;
pub mod landing;
pub mod retry;
pub mod session;
pub mod store;
pub mod url_prefix;

pub use bundle::{LanguageBundle, LocaleDocument};
pub use config::Config;
pub use endpoint_cache::{EndpointLoader, EndpointState};
pub use landing::{FetchError, LandingClient};
pub use session::{LanguageSession, SessionState};
pub use store::PreferenceStore;
pub use url_prefix::{compute_path, HistoryMode, UrlSynchronizer};
