pub mod dates;
pub mod errors;
pub mod extractors;
pub mod jwt;
pub mod validation;
