//! Concrete wire message types built on the tagged field codec.
//!
//! Each message type owns a private tag space: a closed set of one-byte tags
//! and, per tag, the typed read that decodes it. Encoding (`dehydrate`)
//! writes the body as tagged fields; decoding (`hydrate`) loops over
//! incoming tags and dispatches them, failing on anything outside the
//! message's known set.

pub mod search;

pub use search::{IndexQueryResult, NvPair, NvValue, SearchQueryResponse, SearchRequestId};
