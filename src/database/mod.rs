mod memory;
mod store;

pub use memory::MemoryStore;
pub use store::Store;

use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{bson::doc, Client, Collection, Database, IndexModel};

use crate::utils::AppError;

const DEFAULT_DATABASE: &str = "course_store";

#[derive(Clone)]
pub struct MongoDB {
    db: Database,
}

impl MongoDB {
    pub async fn new(uri: &str) -> Result<Self, AppError> {
        let mut client_options = ClientOptions::parse(uri).await?;

        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(2);
        client_options.max_idle_time = Some(std::time::Duration::from_secs(300));
        client_options.connect_timeout = Some(std::time::Duration::from_secs(5));
        client_options.server_selection_timeout = Some(std::time::Duration::from_secs(5));
        client_options.app_name = Some("course-store".to_string());

        let db_name = client_options
            .default_database
            .clone()
            .unwrap_or_else(|| DEFAULT_DATABASE.to_string());

        let client = Client::with_options(client_options)?;
        let db = client.database(&db_name);

        // Fail fast on an unreachable server
        db.run_command(doc! { "ping": 1 }).await?;
        log::info!("📊 Using database: {}", db_name);

        let mongodb = Self { db };
        mongodb.ensure_indexes().await?;

        Ok(mongodb)
    }

    /// Creates the indexes the store relies on. The unique ones back the
    /// one-account-per-email and one-purchase-per-course guarantees, so
    /// failing to create one of them fails startup.
    async fn ensure_indexes(&self) -> Result<(), AppError> {
        log::info!("🔧 Creating database indexes...");

        let unique = || IndexOptions::builder().unique(true).build();

        let indexes = [
            ("users", doc! { "email": 1 }, true),
            ("admins", doc! { "email": 1 }, true),
            ("purchases", doc! { "userId": 1, "courseId": 1 }, true),
            ("courses", doc! { "createdAt": -1 }, false),
            ("courses", doc! { "creatorId": 1 }, false),
            ("orders", doc! { "userId": 1 }, false),
        ];

        for (collection, keys, is_unique) in indexes {
            let label = format!("{}({})", collection, keys.keys().cloned().collect::<Vec<_>>().join(", "));
            let model = if is_unique {
                IndexModel::builder().keys(keys).options(unique()).build()
            } else {
                IndexModel::builder().keys(keys).build()
            };

            let created = self
                .collection::<mongodb::bson::Document>(collection)
                .create_index(model)
                .await;
            index_outcome(&label, is_unique, created)?;
        }

        log::info!("✅ Database indexes ready");
        Ok(())
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

/// Unique indexes are required; the others only speed up queries.
fn index_outcome<T, E: std::fmt::Display>(label: &str, is_unique: bool, created: Result<T, E>) -> Result<(), AppError> {
    match created {
        Ok(_) => {
            log::info!("   ✅ Index ready: {}", label);
            Ok(())
        }
        Err(e) if is_unique => {
            log::error!("   ❌ Unique index {} not created: {}", label, e);
            Err(AppError::Database(format!("unique index {} not created: {}", label, e)))
        }
        Err(e) => {
            log::warn!("   ⚠️  Index {} skipped: {}", label, e);
            Ok(())
        }
    }
}
