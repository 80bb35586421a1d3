//! Database schema definitions.
//!
//! The SQL lives in `migrations/`; this module names the tables and mirrors
//! the seeded product catalogue for backends that do not run migrations.

/// Table names in the PostgreSQL schema.
pub mod table {
    /// Credentials and balances, keyed by `username`.
    pub const USERS: &str = "users";

    /// Product catalogue, keyed by `product_name`.
    pub const PRODUCTS: &str = "products";

    /// Append-only purchase log.
    pub const PURCHASES: &str = "purchases";

    /// Append-only transfer log.
    pub const TRANSFERS: &str = "transfers";
}

/// Products seeded by the initial migration, as `(name, price)`.
pub const DEFAULT_PRODUCTS: &[(&str, i64)] = &[
    ("t-shirt", 80),
    ("cup", 20),
    ("book", 50),
    ("pen", 10),
    ("powerbank", 200),
    ("hoody", 300),
    ("umbrella", 200),
    ("socks", 10),
    ("wallet", 50),
    ("pink-hoody", 500),
];

/// Returns all table names, in dependency order.
#[must_use]
pub fn all_tables() -> Vec<&'static str> {
    vec![
        table::USERS,
        table::PRODUCTS,
        table::PURCHASES,
        table::TRANSFERS,
    ]
}
