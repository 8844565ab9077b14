// Problem module.
// Identity resolution, cached facts, and the persistent problem cache.

pub mod cache;
pub mod facts;
pub mod identity;

pub use cache::{CacheStore, ProblemCache};
pub use facts::{Difficulty, FactsPatch, ProblemFacts};
pub use identity::ProblemId;
