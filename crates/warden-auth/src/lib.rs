//! Warden Auth: bearer tokens, password hashing, the service layer for
//! admins, clients and client users, and the bearer gate.

pub mod config;
pub mod error;
pub mod gate;
pub mod password;
pub mod service;
pub mod token;

pub use config::AuthConfig;
pub use error::AuthError;
pub use gate::{AuthenticatedAdmin, AuthenticatedClientUser, BearerGate, extract_bearer_token};
pub use password::CredentialStore;
pub use service::{
    AdminService, ClientLoginInput, ClientService, ClientUserService, CreateClientInput,
    CreateClientOutput, CreateClientUserInput, LoginInput, LoginOutput, SignupInput, SignupOutput,
    UserInfo,
};
pub use token::{IssuedToken, TokenClaims, TokenScope, TokenService};
