//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_effective_permission_cache;
mod in_memory_rbac_repository;
mod postgres_membership_repository;
mod postgres_override_repository;
mod postgres_permission_repository;
mod postgres_role_repository;

pub use in_memory_effective_permission_cache::InMemoryEffectivePermissionCache;
pub use in_memory_rbac_repository::InMemoryRbacRepository;
pub use postgres_membership_repository::PostgresMembershipRepository;
pub use postgres_override_repository::PostgresOverrideRepository;
pub use postgres_permission_repository::PostgresPermissionRepository;
pub use postgres_role_repository::PostgresRoleRepository;

/// Embedded SQL migrations for the PostgreSQL backend.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

fn fetch_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

fn id_strings<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values.map(str::to_owned).collect()
}
