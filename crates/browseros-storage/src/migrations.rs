// SPDX-FileCopyrightText: 2026 BrowserOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedded schema using refinery.
//!
//! SQL files under `migrations/` are compiled into the binary at build time
//! via `embed_migrations!` and applied on every open. Refinery tracks what has
//! been applied in its own `refinery_schema_history` table, so re-opening an
//! existing store is a no-op.

use browseros_core::MemoryError;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Apply the embedded schema to `conn`.
pub fn run_migrations(conn: &mut rusqlite::Connection) -> Result<(), MemoryError> {
    let report = embedded::migrations::runner()
        .run(conn)
        .map_err(MemoryError::storage)?;
    for migration in report.applied_migrations() {
        tracing::debug!(migration = %migration, "applied chat memory migration");
    }
    Ok(())
}
