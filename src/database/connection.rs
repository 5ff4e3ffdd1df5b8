use mongodb::bson::{doc, Document};
use mongodb::options::IndexOptions;
use mongodb::{Client, Database, IndexModel};

use crate::config::AppConfig;

pub async fn get_db_client(config: &AppConfig) -> Database {
    let client = Client::with_uri_str(&config.database_url)
        .await
        .expect("Failed to connect to MongoDB");

    let db = client.database(&config.database_name);

    match ensure_indexes(&db).await {
        Ok(_) => tracing::info!("Connected to database: {}", config.database_name),
        Err(e) => tracing::warn!("Failed to create indexes: {}", e),
    }

    db
}

/// One user and at most one live OTP record per mobile number are
/// enforced at the store, not just in handler logic.
async fn ensure_indexes(db: &Database) -> mongodb::error::Result<()> {
    let unique = |keys: Document| {
        IndexModel::builder()
            .keys(keys)
            .options(IndexOptions::builder().unique(true).build())
            .build()
    };
    let plain = |keys: Document| IndexModel::builder().keys(keys).build();

    db.collection::<Document>("users")
        .create_index(unique(doc! { "mobile": 1 }))
        .await?;

    db.collection::<Document>("otps")
        .create_index(unique(doc! { "mobile": 1 }))
        .await?;

    db.collection::<Document>("otp_requests")
        .create_index(plain(doc! { "mobile": 1, "requested_at": 1 }))
        .await?;

    db.collection::<Document>("complaints")
        .create_index(unique(doc! { "complaint_number": 1 }))
        .await?;

    db.collection::<Document>("complaints")
        .create_index(plain(doc! { "user_id": 1, "utility": 1, "created_at": -1 }))
        .await?;

    db.collection::<Document>("connections")
        .create_index(unique(doc! { "user_id": 1, "utility": 1, "consumer_number": 1 }))
        .await?;

    db.collection::<Document>("payments")
        .create_index(plain(doc! { "provider_intent_id": 1 }))
        .await?;

    Ok(())
}
