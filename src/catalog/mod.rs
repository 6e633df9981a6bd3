pub mod regions;
pub mod slug;
pub mod terms;

pub use regions::{Catalog, District, Region, RegionKind};
pub use slug::slugify;
pub use terms::{HeatTerm, TermCategory, TermDictionary};
