pub mod models;
pub mod reader;

#[allow(unused_imports)]
pub use models::{Cell, Grid};
