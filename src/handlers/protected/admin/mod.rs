pub mod users;

pub use users::{user_delete, user_get, user_put, users_get, users_post};
