pub mod catalog;
pub mod common;
pub mod health;
pub mod insurance;
pub mod patients;
pub mod payments;
pub mod receptions;
