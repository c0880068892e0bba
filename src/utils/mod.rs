pub mod deserialize;
pub mod extractors;
pub mod jwt;
