//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `tracing-subscriber` formatter whose level
//! comes from `RUST_LOG`. Module paths are hidden (`with_target(false)`); the
//! structured fields say which table, view or pair a line is about.
//!
//! ```bash
//! # Lifecycle, mutations and toggles
//! RUST_LOG=info cargo run
//!
//! # Every store request, cache hits and misses, composed filters
//! RUST_LOG=debug cargo run
//!
//! # Only the store
//! RUST_LOG=record_store=debug cargo run
//! ```
//!
//! With `RUST_LOG=info` a like from the demo reads:
//!
//! ```text
//! INFO Signed in user_id=u1
//! INFO toggle: Inserted table="liked_properties" size=1 property=p1
//! INFO toggle: Favorite toggled key=u1:p1 status=Liked property=p1
//! ```
//!
//! With `RUST_LOG=debug` the same click also shows the existence check:
//!
//! ```text
//! DEBUG toggle:exists: Sending request property=p1 table="liked_properties" ...
//! DEBUG toggle:exists: Query table="liked_properties" predicates=[Eq { .. }, Eq { .. }]
//! ```

/// Installs the global subscriber. Call once, at program start.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
