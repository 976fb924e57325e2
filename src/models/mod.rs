pub mod debt;

pub use debt::{Debt, Stage};
