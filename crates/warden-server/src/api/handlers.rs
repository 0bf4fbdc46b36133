//! Route handlers. Each one binds the request, calls a service and
//! wraps the outcome in the response envelope.

use axum::extract::{Path, State};
use serde::Serialize;
use serde_json::Value;
use surrealdb::Connection;
use uuid::Uuid;
use warden_auth::{
    ClientLoginInput, CreateClientInput, CreateClientOutput, CreateClientUserInput, LoginInput,
    LoginOutput, SignupInput, SignupOutput,
};
use warden_core::models::client::Client;
use warden_core::models::client_config::ClientConfig;
use warden_core::models::client_user::ClientUser;

use super::extract::{AdminBearer, ApiJson, ClientUserBearer, parse_client_id};
use super::response::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Serialize)]
pub struct PingData {
    service: &'static str,
}

pub async fn ping() -> ApiResponse<PingData> {
    ApiResponse::ok("Application is running...", PingData { service: "warden" })
}

// ---------------------------------------------------------------------------
// Admin users
// ---------------------------------------------------------------------------

pub async fn signup<C: Connection>(
    State(state): State<AppState<C>>,
    ApiJson(input): ApiJson<SignupInput>,
) -> ApiResult<SignupOutput> {
    let out = state.admins.signup(input).await?;
    Ok(ApiResponse::created("User created successfully", out))
}

pub async fn login<C: Connection>(
    State(state): State<AppState<C>>,
    ApiJson(input): ApiJson<LoginInput>,
) -> ApiResult<LoginOutput> {
    let out = state.admins.login(input).await?;
    Ok(ApiResponse::ok("Login successful", out))
}

#[derive(Serialize)]
pub struct WhoAmI {
    user_id: Uuid,
    username: String,
}

pub async fn protected_test(AdminBearer(admin): AdminBearer) -> ApiResponse<WhoAmI> {
    ApiResponse::ok(
        "Test successful",
        WhoAmI {
            user_id: admin.id(),
            username: admin.user.username,
        },
    )
}

// ---------------------------------------------------------------------------
// Clients
// ---------------------------------------------------------------------------

pub async fn list_clients<C: Connection>(
    State(state): State<AppState<C>>,
    AdminBearer(admin): AdminBearer,
) -> ApiResult<Vec<Client>> {
    let clients = state.clients.list_clients(&admin).await?;
    Ok(ApiResponse::ok("Successfully retrieved all clients", clients))
}

pub async fn create_client<C: Connection>(
    State(state): State<AppState<C>>,
    AdminBearer(admin): AdminBearer,
    ApiJson(input): ApiJson<CreateClientInput>,
) -> ApiResult<CreateClientOutput> {
    let out = state.clients.create_client(&admin, input).await?;
    Ok(ApiResponse::created("Client created successfully", out))
}

pub async fn get_client_config<C: Connection>(
    State(state): State<AppState<C>>,
    AdminBearer(admin): AdminBearer,
    Path(client_id): Path<String>,
) -> ApiResult<ClientConfig> {
    let client_id = parse_client_id(&client_id)?;
    let config = state.clients.client_config(&admin, client_id).await?;
    Ok(ApiResponse::ok("Successfully retrieved client config", config))
}

pub async fn put_client_config<C: Connection>(
    State(state): State<AppState<C>>,
    AdminBearer(admin): AdminBearer,
    Path(client_id): Path<String>,
    ApiJson(settings): ApiJson<Value>,
) -> ApiResult<ClientConfig> {
    let client_id = parse_client_id(&client_id)?;
    let config = state
        .clients
        .update_client_config(&admin, client_id, settings)
        .await?;
    Ok(ApiResponse::ok("Client config updated", config))
}

// ---------------------------------------------------------------------------
// Client users
// ---------------------------------------------------------------------------

pub async fn create_client_user<C: Connection>(
    State(state): State<AppState<C>>,
    AdminBearer(admin): AdminBearer,
    ApiJson(input): ApiJson<CreateClientUserInput>,
) -> ApiResult<ClientUser> {
    let user = state.client_users.create_client_user(&admin, input).await?;
    Ok(ApiResponse::created("User successfully added", user))
}

pub async fn list_client_users<C: Connection>(
    State(state): State<AppState<C>>,
    AdminBearer(admin): AdminBearer,
    Path(client_id): Path<String>,
) -> ApiResult<Vec<ClientUser>> {
    let client_id = parse_client_id(&client_id)?;
    let users = state
        .client_users
        .list_client_users(&admin, client_id)
        .await?;
    Ok(ApiResponse::ok("Successfully retrieved client users", users))
}

pub async fn client_user_login<C: Connection>(
    State(state): State<AppState<C>>,
    ApiJson(input): ApiJson<ClientLoginInput>,
) -> ApiResult<LoginOutput> {
    let out = state.client_users.authenticate_client_user(input).await?;
    Ok(ApiResponse::ok("Login successful", out))
}

/// The calling client user. The client secret is not echoed back.
#[derive(Serialize)]
pub struct ClientUserProfile {
    client_id: Uuid,
    client_name: String,
    user: ClientUser,
}

pub async fn client_me(
    ClientUserBearer(principal): ClientUserBearer,
) -> ApiResponse<ClientUserProfile> {
    ApiResponse::ok(
        "Authenticated",
        ClientUserProfile {
            client_id: principal.client.id,
            client_name: principal.client.client_name,
            user: principal.user,
        },
    )
}
