//! Integration tests for the bearer gate against in-memory SurrealDB.

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;
use warden_auth::{
    AdminService, AuthConfig, BearerGate, ClientLoginInput, ClientService, ClientUserService,
    CreateClientInput, CreateClientUserInput, CredentialStore, LoginInput, SignupInput,
    TokenScope, TokenService,
};
use warden_core::WardenError;
use warden_core::models::schema::SchemaName;
use warden_core::repository::AdminUserRepository;
use warden_db::SurrealSchemaProvisioner;
use warden_db::repository::{
    SurrealAdminUserRepository, SurrealClientRepository, SurrealTenantRepositoryFactory,
};

type Gate =
    BearerGate<SurrealAdminUserRepository<Db>, SurrealClientRepository<Db>, SurrealTenantRepositoryFactory<Db>>;

struct Fixture {
    gate: Gate,
    tokens: TokenService,
    admins: SurrealAdminUserRepository<Db>,
    admin_id: Uuid,
    admin_header: String,
    client_id: Uuid,
    client_user_header: String,
}

fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

/// One admin with one client holding one user, all logged in.
async fn setup() -> Fixture {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    warden_db::run_migrations(&db).await.unwrap();

    let config = AuthConfig {
        jwt_secret: "gate-secret".into(),
        ..AuthConfig::default()
    };
    let home = SchemaName::parse("test").unwrap();
    let tokens = TokenService::new(&config).unwrap();
    let credentials = CredentialStore::new(&config);
    let admins = SurrealAdminUserRepository::new(db.clone());
    let clients = SurrealClientRepository::new(db.clone());
    let tenants = SurrealTenantRepositoryFactory::new(db.clone(), home.clone());

    let admin_service = AdminService::new(admins.clone(), credentials.clone(), tokens.clone());
    let client_service = ClientService::new(
        clients.clone(),
        SurrealSchemaProvisioner::new(db.clone(), home),
        tenants.clone(),
    );
    let client_user_service =
        ClientUserService::new(clients.clone(), tenants.clone(), credentials, tokens.clone());
    let gate = BearerGate::new(tokens.clone(), admins.clone(), clients, tenants);

    admin_service
        .signup(SignupInput {
            username: "alice".into(),
            email: "alice@example.com".into(),
            password: "password123".into(),
        })
        .await
        .unwrap();
    let login = admin_service
        .login(LoginInput {
            username: "alice".into(),
            password: "password123".into(),
        })
        .await
        .unwrap();
    let admin_header = bearer(&login.token);
    let admin = gate.authenticate_admin(Some(&admin_header)).await.unwrap();

    let client = client_service
        .create_client(
            &admin,
            CreateClientInput {
                client_name: "acme".into(),
            },
        )
        .await
        .unwrap();
    client_user_service
        .create_client_user(
            &admin,
            CreateClientUserInput {
                client_id: client.client_id,
                username: "carol".into(),
                email: "carol@example.com".into(),
                password: "password123".into(),
            },
        )
        .await
        .unwrap();
    let user_login = client_user_service
        .authenticate_client_user(ClientLoginInput {
            client_secret: client.client_secret,
            username: "carol".into(),
            password: "password123".into(),
        })
        .await
        .unwrap();

    Fixture {
        gate,
        tokens,
        admins,
        admin_id: admin.id(),
        admin_header,
        client_id: client.client_id,
        client_user_header: bearer(&user_login.token),
    }
}

fn is_unauthorized<T: std::fmt::Debug>(result: Result<T, WardenError>) -> bool {
    matches!(result, Err(WardenError::Unauthorized { .. }))
}

#[tokio::test]
async fn admin_token_authenticates_admin() {
    let fx = setup().await;
    let admin = fx
        .gate
        .authenticate_admin(Some(&fx.admin_header))
        .await
        .unwrap();
    assert_eq!(admin.id(), fx.admin_id);
    assert_eq!(admin.user.username, "alice");
}

#[tokio::test]
async fn malformed_headers_are_rejected() {
    let fx = setup().await;
    let raw_token = fx.admin_header.trim_start_matches("Bearer ").to_string();

    assert!(is_unauthorized(fx.gate.authenticate_admin(None).await));
    assert!(is_unauthorized(fx.gate.authenticate_admin(Some(&raw_token)).await));
    assert!(is_unauthorized(
        fx.gate.authenticate_admin(Some("Bearer garbage")).await
    ));
}

#[tokio::test]
async fn token_for_deleted_user_is_rejected() {
    let fx = setup().await;
    fx.admins.delete(fx.admin_id).await.unwrap();

    let err = fx
        .gate
        .authenticate_admin(Some(&fx.admin_header))
        .await
        .unwrap_err();
    assert_eq!(err, WardenError::unauthorized("User not found"));
}

#[tokio::test]
async fn token_for_unknown_user_is_rejected() {
    let fx = setup().await;
    let issued = fx.tokens.issue(Uuid::new_v4(), TokenScope::Admin).unwrap();
    assert!(is_unauthorized(
        fx.gate.authenticate_admin(Some(&bearer(&issued.token))).await
    ));
}

#[tokio::test]
async fn token_from_other_key_is_rejected() {
    let fx = setup().await;
    let foreign = TokenService::new(&AuthConfig {
        jwt_secret: "someone-else".into(),
        ..AuthConfig::default()
    })
    .unwrap();
    let issued = foreign.issue(fx.admin_id, TokenScope::Admin).unwrap();
    assert!(is_unauthorized(
        fx.gate.authenticate_admin(Some(&bearer(&issued.token))).await
    ));
}

#[tokio::test]
async fn scopes_do_not_cross() {
    let fx = setup().await;

    assert!(is_unauthorized(
        fx.gate.authenticate_admin(Some(&fx.client_user_header)).await
    ));
    assert!(is_unauthorized(
        fx.gate
            .authenticate_client_user(Some(&fx.admin_header))
            .await
    ));
}

#[tokio::test]
async fn client_user_token_authenticates_in_its_schema() {
    let fx = setup().await;
    let principal = fx
        .gate
        .authenticate_client_user(Some(&fx.client_user_header))
        .await
        .unwrap();
    assert_eq!(principal.client.id, fx.client_id);
    assert_eq!(principal.user.username, "carol");
}

#[tokio::test]
async fn client_user_token_for_other_client_is_rejected() {
    let fx = setup().await;
    let claims = fx
        .tokens
        .verify(fx.client_user_header.trim_start_matches("Bearer "))
        .unwrap();

    // Same user ID, but scoped to a client that does not exist.
    let forged = fx
        .tokens
        .issue(claims.user_id, TokenScope::Client(Uuid::new_v4()))
        .unwrap();
    assert!(is_unauthorized(
        fx.gate
            .authenticate_client_user(Some(&bearer(&forged.token)))
            .await
    ));
}
