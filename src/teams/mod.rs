pub mod matching;
pub mod normalizer;
pub mod registry;

pub use matching::are_equivalent;
pub use normalizer::{normalize, normalize_for_lookup, normalize_for_matching, NormalizeMode};
pub use registry::TeamRegistry;
