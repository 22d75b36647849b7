pub mod curriculum;
pub mod dashboard;
pub mod evaluation;
pub mod practice;
pub mod reveal;
