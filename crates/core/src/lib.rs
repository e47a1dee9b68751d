pub mod conference;
pub mod config;
pub mod errors;
pub mod extract;
pub mod record;
pub mod sources;

pub use conference::{resolve, ResolvedConference, CONFERENCE_ALIASES, SOURCE_CATALOG};
pub use errors::{PipelineError, SourceError};
pub use extract::extract;
pub use record::{DeadlineEntry, NormalizedDeadline, RawConferenceRecord};
pub use sources::{fetch_all, ConferenceData, DocumentFetcher, HttpDocumentFetcher};
