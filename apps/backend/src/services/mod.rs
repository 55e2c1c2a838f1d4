pub mod practice;
pub mod speech;
