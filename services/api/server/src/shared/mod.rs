pub mod errors;
pub mod extractors;
pub mod patch;
pub mod price;
