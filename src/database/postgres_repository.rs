use sqlx::PgPool;

/// Carries the connection pool for every Postgres-backed query in the
/// `database` module.
#[derive(Clone)]
pub struct PostgresRepository {
    pub pool: PgPool,
}
