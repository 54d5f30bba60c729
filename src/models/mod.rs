pub mod profile;
pub mod series;
