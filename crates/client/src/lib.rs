//! Client code for wikicache.
//!
//! This crate provides the upstream summary client, the spelling corrector,
//! and the resolver that ties them to the cache.

pub mod lookup;
pub mod spell;
pub mod summary;

pub use lookup::{Resolved, Resolver, ResolverOptions, Source};
pub use spell::{DictionaryError, SpellCorrector, Suggestion};
pub use summary::{SummaryClient, SummaryConfig, SummaryError, SummaryFetcher};
