use estate_discovery::config::MarketplaceConfig;
use estate_discovery::favorites::FavoriteError;
use estate_discovery::filter::FilterCriteria;
use estate_discovery::lifecycle::MarketplaceSystem;
use estate_discovery::listing::ListingView;
use estate_discovery::model::{
    FavoriteState, FavoriteStatus, NewProperty, PropertyId, PropertyStatus, PropertyType, Session,
    UserId,
};
use record_store::RecordStore;

fn listing(owner: &str, title: &str, price: f64, city: &str) -> NewProperty {
    NewProperty {
        owner_id: UserId::from(owner),
        title: title.to_string(),
        description: Some("Quiet street".to_string()),
        property_type: PropertyType::House,
        price,
        location: "Baner".to_string(),
        city: city.to_string(),
        state: "Maharashtra".to_string(),
        size: 1500.0,
        bedrooms: Some(3),
        bathrooms: None,
        images: Vec::new(),
        contact_name: "Ravi".to_string(),
        contact_phone: "+91 90000 00000".to_string(),
        contact_email: "ravi@example.com".to_string(),
        status: PropertyStatus::Available,
    }
}

/// Inserts with an explicit timestamp so "newest first" is deterministic.
async fn seed(system: &MarketplaceSystem, property: NewProperty, created_at: &str) -> PropertyId {
    let mut record = property.into_record().unwrap();
    record.insert("created_at".into(), created_at.into());
    let stored = system.store.insert("properties", record).await.unwrap();
    PropertyId::from(stored["id"].as_str().unwrap())
}

#[tokio::test]
async fn test_public_search_end_to_end() {
    let system = MarketplaceSystem::new(MarketplaceConfig::default());

    let old = seed(&system, listing("o1", "Hillside Villa", 2_500_000.0, "Pune"), "2024-01-01T00:00:00Z").await;
    let cheap = seed(&system, listing("o1", "Villa Verde", 1_800_000.0, "Pune"), "2024-02-01T00:00:00Z").await;
    let new = seed(&system, listing("o2", "Villa Grande", 3_000_000.0, "pune"), "2024-03-01T00:00:00Z").await;
    let mut sold = listing("o2", "Sold Villa", 2_200_000.0, "Pune");
    sold.status = PropertyStatus::Unavailable;
    seed(&system, sold, "2024-04-01T00:00:00Z").await;
    seed(&system, listing("o3", "Beach Villa", 5_000_000.0, "Goa"), "2024-05-01T00:00:00Z").await;

    let criteria = FilterCriteria::new().term("villa").city("Pune").min_price("2000000");
    let found = system
        .listings
        .fetch(ListingView::Public, Some(&criteria), None)
        .await
        .unwrap();

    let ids: Vec<_> = found.iter().map(|p| p.id.clone()).collect();
    assert_eq!(ids, vec![new, old]);
    assert!(!ids.contains(&cheap));

    let inverted = FilterCriteria::new().min_price("500").max_price("100");
    let none = system
        .listings
        .fetch(ListingView::Public, Some(&inverted), None)
        .await
        .unwrap();
    assert!(none.is_empty());

    let all = system.listings.fetch(ListingView::Public, None, None).await.unwrap();
    assert_eq!(all.len(), 4);

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_personal_views_follow_the_session() {
    let system = MarketplaceSystem::new(MarketplaceConfig::default());
    let mine = seed(&system, listing("u1", "My Flat", 900_000.0, "Pune"), "2024-01-01T00:00:00Z").await;
    let mut hidden = listing("u1", "My Old Flat", 700_000.0, "Pune");
    hidden.status = PropertyStatus::Unavailable;
    let old = seed(&system, hidden, "2023-01-01T00:00:00Z").await;
    seed(&system, listing("u2", "Their Flat", 800_000.0, "Pune"), "2024-01-02T00:00:00Z").await;

    assert!(system
        .listings
        .fetch(ListingView::MyListings, None, None)
        .await
        .unwrap()
        .is_empty());

    system.sessions.sign_in(Session::new("u1"));
    let session = system.sessions.current();
    let own: Vec<_> = system
        .listings
        .fetch(ListingView::MyListings, None, session.as_ref())
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();
    // Every status, newest first.
    assert_eq!(own, vec![mine, old]);

    system.sessions.sign_in(Session::new("u2"));
    let session = system.sessions.current();
    let theirs = system
        .listings
        .fetch(ListingView::MyListings, None, session.as_ref())
        .await
        .unwrap();
    assert_eq!(theirs.len(), 1);
    assert_eq!(theirs[0].title, "Their Flat");

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_favorites_round_trip() {
    let system = MarketplaceSystem::new(MarketplaceConfig::default());
    let villa = seed(&system, listing("o1", "Hillside Villa", 2_500_000.0, "Pune"), "2024-01-01T00:00:00Z").await;
    let user = UserId::from("u1");

    let rejected = system.toggle_favorite(None, &villa).await;
    assert!(matches!(rejected, Err(FavoriteError::Unauthenticated)));

    system.sessions.sign_in(Session::new("u1"));
    let session = system.sessions.current();
    assert!(system
        .listings
        .fetch(ListingView::Liked, None, session.as_ref())
        .await
        .unwrap()
        .is_empty());

    let liked = system.toggle_favorite(session.as_ref(), &villa).await.unwrap();
    assert_eq!(liked, FavoriteStatus::Liked);
    let favorites = system
        .listings
        .fetch(ListingView::Liked, None, session.as_ref())
        .await
        .unwrap();
    assert_eq!(favorites.len(), 1);
    assert_eq!(favorites[0].id, villa);

    // Sign-out forgets what was known; a fresh check reads the store again.
    system.sessions.sign_out();
    assert_eq!(system.favorites.known_state(&user, &villa), FavoriteState::Unknown);
    system.sessions.sign_in(Session::new("u1"));
    let session = system.sessions.current();
    assert_eq!(
        system.favorites.check_status(&user, &villa).await.unwrap(),
        FavoriteStatus::Liked
    );

    let unliked = system.toggle_favorite(session.as_ref(), &villa).await.unwrap();
    assert_eq!(unliked, FavoriteStatus::NotLiked);
    assert!(system
        .listings
        .fetch(ListingView::Liked, None, session.as_ref())
        .await
        .unwrap()
        .is_empty());

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_featured_and_detail() {
    let config = MarketplaceConfig {
        featured_limit: 2,
        ..MarketplaceConfig::default()
    };
    let system = MarketplaceSystem::new(config);
    let first = system
        .add_property(listing("o1", "One", 1_000_000.0, "Pune"))
        .await
        .unwrap();
    for title in ["Two", "Three"] {
        system
            .add_property(listing("o1", title, 1_000_000.0, "Pune"))
            .await
            .unwrap();
    }

    let featured = system.listings.fetch(ListingView::Featured, None, None).await.unwrap();
    assert_eq!(featured.len(), 2);

    let detail = system.listings.fetch_property(&first).await.unwrap().unwrap();
    assert_eq!(detail.title, "One");
    assert_eq!(detail.display_price(), "₹10,00,000");
    assert!(system
        .listings
        .fetch_property(&PropertyId::from("missing"))
        .await
        .unwrap()
        .is_none());

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_zero_store_buffer_from_config_file() {
    let config: MarketplaceConfig = serde_json::from_str(r#"{ "store_buffer": 0 }"#).unwrap();
    let system = MarketplaceSystem::new(config);

    let id = system
        .add_property(listing("o1", "Tiny Buffer Villa", 1_000_000.0, "Pune"))
        .await
        .unwrap();
    let found = system.listings.fetch_property(&id).await.unwrap();
    assert!(found.is_some());

    system.shutdown().await.unwrap();
}
