//! Binary tile formats

pub mod chr;
