pub mod auth;
pub mod principals;
