use diesel_migrations::MigrationHarness;
use testcontainers::core::{ContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, GenericImage, ImageExt};

use crate::db::{create_pool, DbPool};

const PG_USER: &str = "rentivo";
const PG_PASSWORD: &str = "rentivo";
const PG_DB: &str = "rentivo_test";

fn unused_local_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("no local port available");
    listener.local_addr().expect("listener has no address").port()
}

/// Throwaway Postgres with the billing schema applied. The container must
/// outlive every connection taken from the pool.
pub async fn setup_db() -> (ContainerAsync<GenericImage>, DbPool) {
    // Host port chosen up front and mapped explicitly.
    let host_port = unused_local_port();
    let container = GenericImage::new("postgres", "16-alpine")
        .with_wait_for(WaitFor::message_on_stderr(
            "database system is ready to accept connections",
        ))
        .with_mapped_port(host_port, ContainerPort::Tcp(5432))
        .with_env_var("POSTGRES_USER", PG_USER)
        .with_env_var("POSTGRES_PASSWORD", PG_PASSWORD)
        .with_env_var("POSTGRES_DB", PG_DB)
        .start()
        .await
        .expect("postgres container did not start");

    let url = format!(
        "postgres://{}:{}@127.0.0.1:{}/{}",
        PG_USER, PG_PASSWORD, host_port, PG_DB
    );
    let pool = create_pool(&url).expect("pool against test database");
    pool.get()
        .expect("connection to test database")
        .run_pending_migrations(crate::MIGRATIONS)
        .expect("billing migrations apply cleanly");
    (container, pool)
}
