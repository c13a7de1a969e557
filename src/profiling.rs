//! # Profiling Guide
//!
//! Structural operations on [`World`](crate::World) emit `tracing` spans when
//! the `profiling` feature is enabled:
//!
//! | span                      | fields                              |
//! |---------------------------|-------------------------------------|
//! | `world.create_entity`     | `components`, `archetype_count`     |
//! | `world.create_archetype`  | `components`, `archetype_count`     |
//! | `world.destroy_entity`    | `entity`                            |
//! | `world.add_components`    | `entity`, `components`              |
//! | `world.remove_components` | `entity`, `components`              |
//! | `world.view_subset`       | `components`                        |
//! | `world.clear`             | `entities`                          |
//!
//! ## Basic Usage
//!
//! Enable the `profiling` feature in your Cargo.toml:
//!
//! ```toml
//! [dependencies]
//! tessera_ecs = { version = "0.3", features = ["profiling"] }
//! ```
//!
//! Then install a subscriber before touching the world:
//!
//! ```ignore
//! let _guard = tessera_ecs::profiling::init_json_trace("trace.json")?;
//!
//! let mut world = World::new(components);
//! world.create_entity((Position::default(), Velocity::default()))?;
//! ```
//!
//! Without the feature every span compiles away.
//!
//! ## Performance Tips
//!
//! 1. Profile in release mode for accurate metrics
//! 2. `cargo run --release --features profiling --bin profile_spawn` writes
//!    a JSON trace of a spawn/migrate/destroy workload

#[cfg(feature = "profiling")]
pub use self::subscriber::init_json_trace;

#[cfg(feature = "profiling")]
mod subscriber {
    use std::fs::File;
    use std::path::Path;

    use tracing_appender::non_blocking::WorkerGuard;

    /// Route all spans to `path` as JSON lines.
    ///
    /// Keep the returned guard alive; dropping it flushes the writer.
    pub fn init_json_trace(path: impl AsRef<Path>) -> std::io::Result<WorkerGuard> {
        let file = File::create(path)?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        tracing_subscriber::fmt()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_max_level(tracing::Level::TRACE)
            .with_thread_ids(true)
            .json()
            .init();
        Ok(guard)
    }
}
