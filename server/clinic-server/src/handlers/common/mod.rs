pub mod crud;

pub use crud::{created, CrudHandler};
