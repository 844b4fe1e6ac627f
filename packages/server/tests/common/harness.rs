//! Test harnesses for integration testing.
//!
//! `TestHarness` runs every action against the in-memory store and mock
//! catalog. `PostgresHarness` starts a shared Postgres container once and
//! runs migrations on first use; tests that need it are ignored unless
//! Docker is available.

#![allow(dead_code)]

use anyhow::{Context, Result};
use registry_core::kernel::{
    MemoryRegistryStore, MockArtifactStore, MockCatalogSource, ServerDeps, TestDependencies,
};
use sqlx::PgPool;
use std::sync::Arc;
use test_context::AsyncTestContext;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

fn init_tracing() {
    // Run tests with: RUST_LOG=debug cargo test -- --nocapture
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Harness over in-memory infrastructure.
///
/// # Example using test-context
///
/// ```ignore
/// use test_context::test_context;
///
/// #[test_context(TestHarness)]
/// #[tokio::test]
/// async fn my_test(ctx: &TestHarness) {
///     let reviewer = create_reviewer(ctx.store.as_ref(), "reviewer").await;
///     // ... test code
/// }
/// ```
pub struct TestHarness {
    pub deps: ServerDeps,
    /// Same store as `deps.store`, with inspection helpers
    pub store: Arc<MemoryRegistryStore>,
    pub catalog: Arc<MockCatalogSource>,
    pub artifacts: Arc<MockArtifactStore>,
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        Self::new()
    }

    async fn teardown(self) {
        // In-memory state is dropped with the harness
    }
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_dependencies(TestDependencies::new())
    }

    pub fn with_dependencies(test_deps: TestDependencies) -> Self {
        init_tracing();

        let store = test_deps.store.clone();
        let catalog = test_deps.catalog.clone();
        let artifacts = test_deps.artifacts.clone();

        Self {
            deps: test_deps.into_deps(),
            store,
            catalog,
            artifacts,
        }
    }
}

/// Shared Postgres container that persists across all tests.
struct SharedTestInfra {
    db_url: String,
    // Keep the container alive for the entire test run
    _postgres: ContainerAsync<Postgres>,
}

static SHARED_INFRA: OnceCell<SharedTestInfra> = OnceCell::const_new();

impl SharedTestInfra {
    async fn init() -> Result<Self> {
        init_tracing();

        let postgres = Postgres::default()
            .with_tag("16")
            .start()
            .await
            .context("Failed to start Postgres container")?;

        let pg_host = postgres.get_host().await?;
        let pg_port = postgres.get_host_port_ipv4(5432).await?;
        let db_url = format!(
            "postgresql://postgres:postgres@{}:{}/postgres",
            pg_host, pg_port
        );

        let pool = PgPool::connect(&db_url)
            .await
            .context("Failed to connect to Postgres for migrations")?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run migrations")?;

        Ok(Self {
            db_url,
            _postgres: postgres,
        })
    }

    async fn get() -> &'static Self {
        SHARED_INFRA
            .get_or_init(|| async {
                Self::init()
                    .await
                    .expect("Failed to initialize shared test infrastructure")
            })
            .await
    }
}

/// Harness with a fresh pool on the shared Postgres container.
pub struct PostgresHarness {
    pub db_pool: PgPool,
}

impl AsyncTestContext for PostgresHarness {
    async fn setup() -> Self {
        Self::new()
            .await
            .expect("Failed to create Postgres harness")
    }

    async fn teardown(self) {
        // Database pool is automatically dropped
    }
}

impl PostgresHarness {
    pub async fn new() -> Result<Self> {
        let infra = SharedTestInfra::get().await;

        let db_pool = PgPool::connect(&infra.db_url)
            .await
            .context("Failed to connect to test database")?;

        Ok(Self { db_pool })
    }
}
