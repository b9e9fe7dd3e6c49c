use rentivo::infrastructure::build_storage;
use rentivo::{create_pool, run_migrations, Settings};

fn main() {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let settings = Settings::from_env().expect("Invalid configuration");
    let pool = create_pool(&settings.database_url).expect("Failed to create database pool");
    run_migrations(&pool).expect("Failed to run database migrations");
    build_storage(&settings.storage).expect("Failed to prepare invoice storage");

    let payments = if settings.pix.key.is_some() {
        "enabled"
    } else {
        "per-billing only"
    };
    log::info!(
        "Database ready; storage {:?} (prefix {:?}); PIX defaults {}",
        settings.storage.kind,
        settings.storage.prefix,
        payments
    );
}
