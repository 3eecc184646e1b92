//! Council Sources
//!
//! HTTP-facing collaborators of the meetings pipeline:
//!
//! - [`CouncilApiClient`]: lists meetings from the municipal API and returns
//!   them filtered and ordered (the pipeline's item fetcher)
//! - [`MinutesClient`]: follows a meeting page to its minutes PDF and returns
//!   the PDF's text, caching results for the life of the process

#![warn(missing_docs)]

pub mod council_api;
pub mod error;
pub mod minutes;

pub use council_api::{ApiKeyLocation, CouncilApiClient, CouncilApiConfig};
pub use error::SourceError;
pub use minutes::{find_minutes_link, resolve_minutes_url, MinutesClient, MinutesConfig};
