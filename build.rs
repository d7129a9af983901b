//! Build script that re-runs when the embedded SQL migrations change.
//!
//! `embed_migrations!` reads `migrations/` at compile time, which Cargo does
//! not track on its own, so the directory is registered explicitly.

fn main() {
    println!("cargo:rerun-if-changed=migrations");
}
