pub mod find;
pub mod health;

pub use find::{find, FindRequest, FindResponse};
pub use health::check;
