//! Service layer: admin signup/login, client management and
//! client-user signup/login.
//!
//! Services are generic over repository implementations so that the
//! auth layer has no dependency on the database crate. They take plain
//! input structs, return typed outputs, and report every failure as a
//! [`WardenError`]. Internal causes are logged here and replaced with a
//! generic message before they leave the service.

mod admin;
mod client;
mod client_user;

pub use admin::{AdminService, LoginInput, LoginOutput, SignupInput, SignupOutput, UserInfo};
pub use client::{ClientService, CreateClientInput, CreateClientOutput};
pub use client_user::{ClientLoginInput, ClientUserService, CreateClientUserInput};

use warden_core::error::WardenError;

const INTERNAL_MESSAGE: &str = "Internal server error";

/// Log an internal failure under `operation` and strip its detail.
///
/// Public errors (validation, conflict and so on) pass through as is.
pub(crate) fn conceal(operation: &'static str) -> impl FnOnce(WardenError) -> WardenError {
    move |err| {
        if err.is_internal() {
            tracing::error!(operation, error = %err, "Internal failure");
            WardenError::internal(INTERNAL_MESSAGE)
        } else {
            err
        }
    }
}
