//! Value objects for the verification domain.

pub mod challenge;
pub mod country_prefix;

pub use challenge::{ChallengeKey, ChallengeKind};
pub use country_prefix::CountryPrefixTable;
