//! Built-in units the server can register at startup.

pub mod arith;
pub mod text;

use microrpc::UnitCatalog;

/// Catalog of every unit compiled into the server.
pub fn builtin_catalog() -> UnitCatalog {
    UnitCatalog::new()
        .with("arith", arith::unit)
        .with("text", text::unit)
}
