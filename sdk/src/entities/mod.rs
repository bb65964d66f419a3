//! Built-in entity kinds

pub mod episode;
pub mod generic;
pub mod series;

pub use episode::Episode;
pub use generic::GenericEntity;
pub use series::Series;
