pub mod attempts;
pub mod curriculum;
pub mod questions;
pub mod stats;
pub mod users;
