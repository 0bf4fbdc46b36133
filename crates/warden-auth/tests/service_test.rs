//! Integration tests for the service layer against in-memory SurrealDB.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::json;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;
use warden_auth::{
    AdminService, AuthConfig, AuthenticatedAdmin, BearerGate, ClientLoginInput, ClientService,
    ClientUserService, CreateClientInput, CreateClientUserInput, CredentialStore, LoginInput,
    SignupInput, TokenScope, TokenService,
};
use warden_core::WardenError;
use warden_core::models::schema::SchemaName;
use warden_core::repository::{ClientRepository, SchemaProvisioner};
use warden_db::SurrealSchemaProvisioner;
use warden_db::repository::{
    SurrealAdminUserRepository, SurrealClientRepository, SurrealTenantRepositoryFactory,
};

type Admins = SurrealAdminUserRepository<Db>;
type Clients = SurrealClientRepository<Db>;
type Tenants = SurrealTenantRepositoryFactory<Db>;

struct Stack {
    db: Surreal<Db>,
    tokens: TokenService,
    admin: AdminService<Admins>,
    client: ClientService<Clients, SurrealSchemaProvisioner<Db>, Tenants>,
    client_user: ClientUserService<Clients, Tenants>,
    gate: BearerGate<Admins, Clients, Tenants>,
}

fn test_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: "test-secret".into(),
        ..AuthConfig::default()
    }
}

async fn setup() -> Stack {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    warden_db::run_migrations(&db).await.unwrap();

    let config = test_config();
    let home = SchemaName::parse("test").unwrap();
    let tokens = TokenService::new(&config).unwrap();
    let credentials = CredentialStore::new(&config);
    let admins = SurrealAdminUserRepository::new(db.clone());
    let clients = SurrealClientRepository::new(db.clone());
    let tenants = SurrealTenantRepositoryFactory::new(db.clone(), home.clone());
    let provisioner = SurrealSchemaProvisioner::new(db.clone(), home);

    Stack {
        admin: AdminService::new(admins.clone(), credentials.clone(), tokens.clone()),
        client: ClientService::new(clients.clone(), provisioner, tenants.clone()),
        client_user: ClientUserService::new(
            clients.clone(),
            tenants.clone(),
            credentials,
            tokens.clone(),
        ),
        gate: BearerGate::new(tokens.clone(), admins, clients, tenants),
        tokens,
        db,
    }
}

fn signup(username: &str) -> SignupInput {
    SignupInput {
        username: username.into(),
        email: format!("{username}@example.com"),
        password: "password123".into(),
    }
}

/// Sign up and log in an admin, returning the authenticated principal.
async fn admin(stack: &Stack, username: &str) -> AuthenticatedAdmin {
    stack.admin.signup(signup(username)).await.unwrap();
    let login = stack
        .admin
        .login(LoginInput {
            username: username.into(),
            password: "password123".into(),
        })
        .await
        .unwrap();
    let header = format!("Bearer {}", login.token);
    stack.gate.authenticate_admin(Some(&header)).await.unwrap()
}

fn client_user(client_id: Uuid, username: &str) -> CreateClientUserInput {
    CreateClientUserInput {
        client_id,
        username: username.into(),
        email: format!("{username}@example.com"),
        password: "password123".into(),
    }
}

// ---------------------------------------------------------------------------
// Admin signup / login
// ---------------------------------------------------------------------------

#[tokio::test]
async fn signup_then_login_issues_admin_token() {
    let stack = setup().await;

    let out = stack.admin.signup(signup("alice")).await.unwrap();
    assert_eq!(out.username, "alice");
    assert_eq!(out.email, "alice@example.com");

    let login = stack
        .admin
        .login(LoginInput {
            username: "alice".into(),
            password: "password123".into(),
        })
        .await
        .unwrap();
    assert_eq!(login.user.id, out.user_id);

    let claims = stack.tokens.verify(&login.token).unwrap();
    assert_eq!(claims.user_id, out.user_id);
    assert_eq!(claims.scope().unwrap(), TokenScope::Admin);
}

#[tokio::test]
async fn signup_validates_input() {
    let stack = setup().await;

    let short = SignupInput {
        password: "short".into(),
        ..signup("alice")
    };
    assert!(matches!(
        stack.admin.signup(short).await,
        Err(WardenError::Validation { .. })
    ));

    let bad_email = SignupInput {
        email: "not-an-email".into(),
        ..signup("alice")
    };
    assert!(matches!(
        stack.admin.signup(bad_email).await,
        Err(WardenError::Validation { .. })
    ));
}

#[tokio::test]
async fn duplicate_signup_is_conflict() {
    let stack = setup().await;
    stack.admin.signup(signup("alice")).await.unwrap();

    let err = stack.admin.signup(signup("alice")).await.unwrap_err();
    assert_eq!(err, WardenError::conflict("Username already exists"));

    let err = stack
        .admin
        .signup(SignupInput {
            username: "alice2".into(),
            ..signup("alice")
        })
        .await
        .unwrap_err();
    assert_eq!(err, WardenError::conflict("Email already exists"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_signups_yield_one_user_and_conflicts() {
    let stack = setup().await;
    let service = Arc::new(AdminService::new(
        SurrealAdminUserRepository::new(stack.db.clone()),
        CredentialStore::new(&test_config()),
        stack.tokens.clone(),
    ));

    let tasks: Vec<_> = (0..4)
        .map(|_| {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.signup(signup("bob")).await })
        })
        .collect();

    let mut created = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => created += 1,
            Err(e) => assert!(matches!(e, WardenError::Conflict { .. }), "got {e:?}"),
        }
    }
    assert_eq!(created, 1);
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let stack = setup().await;
    stack.admin.signup(signup("alice")).await.unwrap();

    let wrong_password = stack
        .admin
        .login(LoginInput {
            username: "alice".into(),
            password: "wrong-password".into(),
        })
        .await
        .unwrap_err();
    let unknown_user = stack
        .admin
        .login(LoginInput {
            username: "mallory".into(),
            password: "password123".into(),
        })
        .await
        .unwrap_err();

    assert_eq!(wrong_password, unknown_user);
    assert_eq!(
        wrong_password,
        WardenError::unauthorized("Invalid username or password")
    );
}

// ---------------------------------------------------------------------------
// Clients
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_client_provisions_schema() {
    let stack = setup().await;
    let alice = admin(&stack, "alice").await;

    let out = stack
        .client
        .create_client(
            &alice,
            CreateClientInput {
                client_name: "acme".into(),
            },
        )
        .await
        .unwrap();

    assert_eq!(out.client_name, "acme");
    assert_eq!(out.client_secret.len(), 64);
    assert_eq!(out.schema_name, SchemaName::derive("alice", "acme"));

    let provisioner =
        SurrealSchemaProvisioner::new(stack.db.clone(), SchemaName::parse("test").unwrap());
    assert!(provisioner.schema_exists(&out.schema_name).await.unwrap());

    let listed = stack.client.list_clients(&alice).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, out.client_id);
}

#[tokio::test]
async fn duplicate_client_name_is_conflict_per_owner() {
    let stack = setup().await;
    let alice = admin(&stack, "alice").await;
    let bob = admin(&stack, "bob").await;
    let input = || CreateClientInput {
        client_name: "acme".into(),
    };

    stack.client.create_client(&alice, input()).await.unwrap();
    let err = stack.client.create_client(&alice, input()).await.unwrap_err();
    assert_eq!(err, WardenError::conflict("Client name already exists"));

    // Another owner may reuse the name.
    let theirs = stack.client.create_client(&bob, input()).await.unwrap();
    assert_eq!(theirs.schema_name, SchemaName::derive("bob", "acme"));
}

#[tokio::test]
async fn list_clients_is_empty_without_clients() {
    let stack = setup().await;
    let alice = admin(&stack, "alice").await;
    assert!(stack.client.list_clients(&alice).await.unwrap().is_empty());
}

#[tokio::test]
async fn client_config_read_and_replace() {
    let stack = setup().await;
    let alice = admin(&stack, "alice").await;
    let client = stack
        .client
        .create_client(
            &alice,
            CreateClientInput {
                client_name: "acme".into(),
            },
        )
        .await
        .unwrap();

    let initial = stack.client.client_config(&alice, client.client_id).await.unwrap();
    assert_eq!(initial.settings, json!({}));

    let updated = stack
        .client
        .update_client_config(&alice, client.client_id, json!({"theme": "dark"}))
        .await
        .unwrap();
    assert_eq!(updated.settings, json!({"theme": "dark"}));

    let err = stack
        .client
        .update_client_config(&alice, client.client_id, json!(["not", "an", "object"]))
        .await
        .unwrap_err();
    assert!(matches!(err, WardenError::Validation { .. }));

    let err = stack.client.client_config(&alice, Uuid::new_v4()).await.unwrap_err();
    assert_eq!(err, WardenError::not_found("Client not found"));
}

#[tokio::test]
async fn other_admins_cannot_reach_a_client() {
    let stack = setup().await;
    let alice = admin(&stack, "alice").await;
    let mallory = admin(&stack, "mallory").await;
    let client = stack
        .client
        .create_client(
            &alice,
            CreateClientInput {
                client_name: "acme".into(),
            },
        )
        .await
        .unwrap();
    stack
        .client_user
        .create_client_user(&alice, client_user(client.client_id, "carol"))
        .await
        .unwrap();
    let not_found = WardenError::not_found("Client not found");

    let err = stack
        .client_user
        .list_client_users(&mallory, client.client_id)
        .await
        .unwrap_err();
    assert_eq!(err, not_found);

    let err = stack
        .client
        .client_config(&mallory, client.client_id)
        .await
        .unwrap_err();
    assert_eq!(err, not_found);

    let err = stack
        .client
        .update_client_config(&mallory, client.client_id, json!({"theme": "hacked"}))
        .await
        .unwrap_err();
    assert_eq!(err, not_found);

    let err = stack
        .client_user
        .create_client_user(&mallory, client_user(client.client_id, "eve"))
        .await
        .unwrap_err();
    assert_eq!(err, not_found);

    // The owner's view is untouched.
    let config = stack
        .client
        .client_config(&alice, client.client_id)
        .await
        .unwrap();
    assert_eq!(config.settings, json!({}));
    let users = stack
        .client_user
        .list_client_users(&alice, client.client_id)
        .await
        .unwrap();
    assert_eq!(users.len(), 1);
}

/// Provisioner whose table migration always fails.
#[derive(Clone, Default)]
struct BrokenProvisioner {
    dropped: Arc<AtomicUsize>,
}

impl SchemaProvisioner for BrokenProvisioner {
    async fn create_schema(&self, _schema: &SchemaName) -> warden_core::WardenResult<()> {
        Ok(())
    }

    async fn migrate_tenant_tables(&self, _schema: &SchemaName) -> warden_core::WardenResult<()> {
        Err(WardenError::internal("disk full"))
    }

    async fn drop_schema(&self, _schema: &SchemaName) -> warden_core::WardenResult<()> {
        self.dropped.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn schema_exists(&self, _schema: &SchemaName) -> warden_core::WardenResult<bool> {
        Ok(false)
    }
}

#[tokio::test]
async fn provisioning_failure_rolls_back_client() {
    let stack = setup().await;
    let alice = admin(&stack, "alice").await;

    let clients = SurrealClientRepository::new(stack.db.clone());
    let provisioner = BrokenProvisioner::default();
    let service = ClientService::new(
        clients.clone(),
        provisioner.clone(),
        SurrealTenantRepositoryFactory::new(stack.db.clone(), SchemaName::parse("test").unwrap()),
    );

    let err = service
        .create_client(
            &alice,
            CreateClientInput {
                client_name: "acme".into(),
            },
        )
        .await
        .unwrap_err();

    assert_eq!(err, WardenError::internal("Failed to initialize client schema"));
    assert_eq!(provisioner.dropped.load(Ordering::SeqCst), 1);
    assert!(
        clients
            .get_by_name_for_owner("acme", alice.id())
            .await
            .unwrap()
            .is_none()
    );
}

// ---------------------------------------------------------------------------
// Client users
// ---------------------------------------------------------------------------

#[tokio::test]
async fn client_user_signup_and_login() {
    let stack = setup().await;
    let alice = admin(&stack, "alice").await;
    let client = stack
        .client
        .create_client(
            &alice,
            CreateClientInput {
                client_name: "acme".into(),
            },
        )
        .await
        .unwrap();

    let user = stack
        .client_user
        .create_client_user(&alice, client_user(client.client_id, "carol"))
        .await
        .unwrap();
    assert_eq!(user.username, "carol");

    let login = stack
        .client_user
        .authenticate_client_user(ClientLoginInput {
            client_secret: client.client_secret.clone(),
            username: "carol".into(),
            password: "password123".into(),
        })
        .await
        .unwrap();
    assert_eq!(login.user.id, user.id);

    let claims = stack.tokens.verify(&login.token).unwrap();
    assert_eq!(claims.scope().unwrap(), TokenScope::Client(client.client_id));

    let users = stack
        .client_user
        .list_client_users(&alice, client.client_id)
        .await
        .unwrap();
    assert_eq!(users.len(), 1);
}

#[tokio::test]
async fn client_user_for_unknown_client_is_not_found() {
    let stack = setup().await;
    let alice = admin(&stack, "alice").await;

    let err = stack
        .client_user
        .create_client_user(&alice, client_user(Uuid::new_v4(), "carol"))
        .await
        .unwrap_err();
    assert_eq!(err, WardenError::not_found("Client not found"));
}

#[tokio::test]
async fn same_username_across_clients_is_allowed() {
    let stack = setup().await;
    let alice = admin(&stack, "alice").await;
    let acme = stack
        .client
        .create_client(
            &alice,
            CreateClientInput {
                client_name: "acme".into(),
            },
        )
        .await
        .unwrap();
    let globex = stack
        .client
        .create_client(
            &alice,
            CreateClientInput {
                client_name: "globex".into(),
            },
        )
        .await
        .unwrap();

    stack
        .client_user
        .create_client_user(&alice, client_user(acme.client_id, "carol"))
        .await
        .unwrap();
    stack
        .client_user
        .create_client_user(&alice, client_user(globex.client_id, "carol"))
        .await
        .unwrap();

    let err = stack
        .client_user
        .create_client_user(&alice, client_user(acme.client_id, "carol"))
        .await
        .unwrap_err();
    assert_eq!(err, WardenError::conflict("Username already exists"));
}

#[tokio::test]
async fn client_login_failures() {
    let stack = setup().await;
    let alice = admin(&stack, "alice").await;
    let acme = stack
        .client
        .create_client(
            &alice,
            CreateClientInput {
                client_name: "acme".into(),
            },
        )
        .await
        .unwrap();
    let globex = stack
        .client
        .create_client(
            &alice,
            CreateClientInput {
                client_name: "globex".into(),
            },
        )
        .await
        .unwrap();
    stack
        .client_user
        .create_client_user(&alice, client_user(acme.client_id, "carol"))
        .await
        .unwrap();

    let login = |secret: &str, username: &str, password: &str| ClientLoginInput {
        client_secret: secret.into(),
        username: username.into(),
        password: password.into(),
    };

    let err = stack
        .client_user
        .authenticate_client_user(login("0".repeat(64).as_str(), "carol", "password123"))
        .await
        .unwrap_err();
    assert_eq!(err, WardenError::not_found("Client not found"));

    let wrong_password = stack
        .client_user
        .authenticate_client_user(login(&acme.client_secret, "carol", "nope-nope"))
        .await
        .unwrap_err();
    // Carol exists only under acme.
    let other_tenant = stack
        .client_user
        .authenticate_client_user(login(&globex.client_secret, "carol", "password123"))
        .await
        .unwrap_err();

    assert_eq!(
        wrong_password,
        WardenError::unauthorized("Invalid username or password")
    );
    assert_eq!(wrong_password, other_tenant);
}
