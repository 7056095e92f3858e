pub mod pagination;

pub use pagination::{list_query, paginated, ListParams};
