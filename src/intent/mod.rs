//! Keyword intent matching
//!
//! Maps a chat message to a canned reply by walking an ordered routing table.
//! Matching is plain lowercase substring containment, so table order is the
//! only tie-breaker between overlapping routes.

mod matcher;
mod profile;

pub use matcher::{DirectiveFlag, IntentMatcher, Reply, Selection};
pub use profile::{
    DEFAULT_PROFILE_ID, FallbackPool, KeywordGroup, ResponseTemplate, Route, RoutingProfile,
    RoutingTable,
};
