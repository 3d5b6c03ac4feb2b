//! Demo: seeds a few listings, searches them, and likes one as a signed-in user.

use estate_discovery::config::MarketplaceConfig;
use estate_discovery::filter::FilterCriteria;
use estate_discovery::lifecycle::{setup_tracing, MarketplaceSystem};
use estate_discovery::listing::ListingView;
use estate_discovery::model::{NewProperty, PropertyStatus, PropertyType, Session, UserId};
use tracing::{error, info, Instrument};

fn listing(owner: &str, title: &str, property_type: PropertyType, price: f64, city: &str) -> NewProperty {
    NewProperty {
        owner_id: UserId::from(owner),
        title: title.to_string(),
        description: None,
        property_type,
        price,
        location: format!("{title} Road"),
        city: city.to_string(),
        state: "Maharashtra".to_string(),
        size: 1200.0,
        bedrooms: Some(3),
        bathrooms: Some(2),
        images: NewProperty::parse_images("https://example.com/a.jpg, https://example.com/b.jpg"),
        contact_name: "Asha".to_string(),
        contact_phone: "+91 98765 43210".to_string(),
        contact_email: "asha@example.com".to_string(),
        status: PropertyStatus::Available,
    }
}

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let system = MarketplaceSystem::new(MarketplaceConfig::from_env());

    let span = tracing::info_span!("seeding");
    async {
        for property in [
            listing("owner", "Hillside Villa", PropertyType::House, 2_500_000.0, "Pune"),
            listing("owner", "Villa Verde", PropertyType::House, 1_800_000.0, "Pune"),
            listing("owner", "Harbour Studio", PropertyType::Apartment, 4_500_000.0, "Mumbai"),
        ] {
            system.add_property(property).await.map_err(|e| e.to_string())?;
        }
        Ok::<_, String>(())
    }
    .instrument(span)
    .await?;

    let criteria = FilterCriteria::new().term("villa").city("Pune").min_price("2000000");
    let found = system
        .listings
        .fetch(ListingView::Public, Some(&criteria), None)
        .await
        .map_err(|e| e.to_string())?;
    for property in &found {
        info!(id = %property.id, title = %property.title, price = %property.display_price(), "Found");
    }

    system.sessions.sign_in(Session::new("u1").with_email("u1@example.com"));
    let session = system.sessions.current();

    let span = tracing::info_span!("favorites");
    let liked = async {
        let Some(first) = found.first() else {
            return Ok(Vec::new());
        };
        system
            .toggle_favorite(session.as_ref(), &first.id)
            .await
            .map_err(|e| e.to_string())?;
        system
            .listings
            .fetch(ListingView::Liked, None, session.as_ref())
            .await
            .map_err(|e| e.to_string())
    }
    .instrument(span)
    .await;

    match liked {
        Ok(liked) => info!(count = liked.len(), "Liked listings"),
        Err(e) => error!(error = %e, "Favorites failed"),
    }

    system.sessions.sign_out();
    system.shutdown().await?;

    info!("Demo completed successfully");
    Ok(())
}
