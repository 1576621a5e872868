pub mod app;
pub mod widgets;

pub use app::{draw, run_app};
