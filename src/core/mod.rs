// Core algorithm exports
pub mod distance;
pub mod filters;
pub mod matcher;
pub mod proposals;

pub use distance::{build_preference_lists, euclidean_distance, validate_scores, PreferenceLists};
pub use filters::{filter_by_orientation, mutually_compatible};
pub use matcher::{MatchError, MatchResult, Matcher};
pub use proposals::{everyone_proposes, ProposalOutcome};
