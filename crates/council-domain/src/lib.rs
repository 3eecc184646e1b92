//! Council Domain Layer
//!
//! Value types and collaborator contracts shared by every other crate in the
//! workspace. Nothing in here performs I/O.
//!
//! ## Key Concepts
//!
//! - **Meeting record**: one council meeting as listed by the municipal API
//! - **Decision**: a structured decision extracted from a meeting's minutes
//! - **Date range**: the inclusive calendar filter a client asks for
//! - **Collaborators**: the fetcher, processor, minutes source and LLM traits
//!   that the streaming pipeline and the server are written against

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod date_range;
pub mod meeting;
pub mod traits;

// Re-exports for convenience
pub use date_range::{filter_by_date, parse_event_date, sort_by_date_desc, DateRange};
pub use meeting::{MeetingDecision, MeetingRecord};
