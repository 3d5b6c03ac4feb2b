//! # Estate Discovery
//!
//! > **Property search and favorites for a listing marketplace.**
//!
//! This crate is the part of the marketplace client that decides *what* a user
//! sees and keeps their favorites consistent: it composes filter fields into a
//! store query, caches listing results per screen, and toggles the per-property
//! "liked" flag without ever creating duplicate or contradictory relation rows.
//!
//! Storage lives behind the [`record_store::RecordStore`] trait. The bundled
//! in-process [`StoreActor`](record_store::StoreActor) answers each call on its
//! own, with no transaction spanning two calls, which is the consistency model of
//! the hosted store the marketplace runs against.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Vocabulary ([`model`], [`tables`])
//! Listings, typed ids, the favorite relation and the session.
//! - **Key items**: [`Property`](model::Property), [`FavoriteKey`](model::FavoriteKey),
//!   [`Session`](model::Session).
//!
//! ### 2. The Search ([`filter`], [`listing`])
//! [`compose`](filter::compose) turns the search form into predicates;
//! [`ListingFetcher`](listing::ListingFetcher) runs them and caches the result
//! per screen, criteria and user.
//!
//! ### 3. The Favorites ([`favorites`])
//! [`FavoriteManager`](favorites::FavoriteManager) checks and toggles a pair.
//! Toggles of the same pair queue behind a per-pair lock and only confirmed
//! outcomes become visible.
//!
//! ### 4. The Orchestrator ([`lifecycle`], [`session`], [`config`])
//! [`MarketplaceSystem`](lifecycle::MarketplaceSystem) spawns the store actor and
//! wires everything to the [`SessionProvider`](session::SessionProvider), whose
//! sign-in and sign-out events clear session-scoped caches.
//!
//! ## 🚀 Quick Start
//!
//! ```rust
//! use estate_discovery::config::MarketplaceConfig;
//! use estate_discovery::lifecycle::MarketplaceSystem;
//! use estate_discovery::listing::ListingView;
//! use estate_discovery::model::Session;
//!
//! #[tokio::main]
//! async fn main() {
//!     let system = MarketplaceSystem::new(MarketplaceConfig::default());
//!     system.sessions.sign_in(Session::new("u1"));
//!     let session = system.sessions.current();
//!
//!     let listings = system
//!         .listings
//!         .fetch(ListingView::Public, None, session.as_ref())
//!         .await
//!         .unwrap();
//!     assert!(listings.is_empty());
//!
//!     system.shutdown().await.unwrap();
//! }
//! ```
//!
//! ### Running the Demo
//!
//! ```bash
//! RUST_LOG=info cargo run
//! ```

pub mod config;
pub mod favorites;
pub mod filter;
pub mod lifecycle;
pub mod listing;
pub mod model;
pub mod session;
pub mod tables;
