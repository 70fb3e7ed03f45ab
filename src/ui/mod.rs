pub mod json;
pub mod views;
