pub mod authority;
pub mod credentials;
pub mod login;
pub mod policy;
pub mod token_service;

pub use credentials::CredentialStore;
pub use login::LoginService;
pub use policy::AccessPolicy;
pub use token_service::TokenService;
