//! Test harness over an in-memory SQLite database.
//!
//! Every harness gets its own database with migrations applied, so tests are
//! isolated without any shared state.

use agent_core::kernel::database::connect_in_memory;
use agent_core::kernel::{ServerDeps, TestDependencies};
use anyhow::{Context, Result};
use sqlx::SqlitePool;
use test_context::AsyncTestContext;

/// Test harness with a fresh database and mock services.
///
/// # Example using test-context
///
/// ```ignore
/// use test_context::test_context;
///
/// #[test_context(TestHarness)]
/// #[tokio::test]
/// async fn my_test(ctx: &TestHarness) {
///     let report = run_scan(&Actor::system(), None, &ctx.deps).await.unwrap();
/// }
/// ```
pub struct TestHarness {
    /// Database pool - use this for test fixtures.
    pub db_pool: SqlitePool,
    /// Mocks wired into `deps`; use them for arrangement and assertions.
    pub mocks: TestDependencies,
    pub deps: ServerDeps,
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        Self::new().await.expect("Failed to create test harness")
    }
}

impl TestHarness {
    pub async fn new() -> Result<Self> {
        Self::with_mocks(TestDependencies::new()).await
    }

    /// Harness with custom mocks (scripted AI answers, failing chats, ...).
    pub async fn with_mocks(mocks: TestDependencies) -> Result<Self> {
        // Run tests with: RUST_LOG=debug cargo test -- --nocapture
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let db_pool = connect_in_memory()
            .await
            .context("Failed to create in-memory database")?;
        let deps = mocks.server_deps(db_pool.clone());

        Ok(Self {
            db_pool,
            mocks,
            deps,
        })
    }
}
