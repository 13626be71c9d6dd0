use mongodb::{
    bson::{doc, Bson, Document},
    options::{IndexOptions, ReturnDocument},
    Client, ClientSession, Collection, Database, IndexModel,
};
use std::ops::RangeInclusive;
use std::time::Duration;

pub const USERS: &str = "users";
pub const PRODUCTS: &str = "products";
pub const CATEGORIES: &str = "categories";
pub const RECIPES: &str = "recipes";
pub const FRIDGE_ENTRIES: &str = "fridge_entries";
pub const USERNAME_INDEX: &str = "username_1";
const COUNTERS: &str = "counters";

/// Handle to the backing store. Created once in `main` and handed to every
/// handler through `web::Data`; the driver client is internally pooled.
#[derive(Clone)]
pub struct MongoDB {
    client: Client,
    db: Database,
}

impl MongoDB {
    pub async fn new(uri: &str) -> mongodb::error::Result<Self> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(5);
        client_options.max_idle_time = Some(Duration::from_secs(300));

        client_options.connect_timeout = Some(Duration::from_secs(5));
        client_options.server_selection_timeout = Some(Duration::from_secs(5));

        let client = Client::with_options(client_options)?;

        // Extract database name from URI or use default
        let db_name = uri
            .rsplit('/')
            .next()
            .and_then(|s| s.split('?').next())
            .filter(|s| !s.is_empty() && !s.contains(':'))
            .unwrap_or("fridge");

        let db = client.database(db_name);

        // Test connection
        db.list_collection_names().await?;

        let mongodb = Self { client, db };
        mongodb.ensure_indexes().await?;

        Ok(mongodb)
    }

    /// Creates the indexes the service relies on.
    async fn ensure_indexes(&self) -> mongodb::error::Result<()> {
        log::info!("🔧 Creating database indexes...");

        // Unique usernames back up the pre-insert check in registration
        let users = self.collection::<Document>(USERS);
        let username_index = IndexModel::builder()
            .keys(doc! { "username": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        users.create_index(username_index).await?;
        log::info!("   ✅ Index ready: users(username) unique");

        let fridge = self.collection::<Document>(FRIDGE_ENTRIES);
        let fridge_index = IndexModel::builder()
            .keys(doc! { "user_id": 1 })
            .build();

        match fridge.create_index(fridge_index).await {
            Ok(_) => log::info!("   ✅ Index ready: fridge_entries(user_id)"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        log::info!("✅ Database indexes ready");

        Ok(())
    }

    /// Reserves `count` consecutive numeric ids from the named sequence and
    /// returns them. Ids taken by an aborted write are not reused.
    pub async fn next_ids(&self, sequence: &str, count: u32) -> mongodb::error::Result<RangeInclusive<i64>> {
        let counters = self.collection::<Document>(COUNTERS);
        let step = i64::from(count.max(1));

        let updated = counters
            .find_one_and_update(doc! { "_id": sequence }, doc! { "$inc": { "seq": step } })
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await?;

        let last = counter_value(updated.as_ref()).ok_or_else(|| {
            log::error!("❌ Counter '{}' has no integer seq: {:?}", sequence, updated);
            mongodb::error::Error::custom(format!("counter '{}' is corrupt", sequence))
        })?;

        Ok(sequence_range(last, step))
    }

    pub async fn next_id(&self, sequence: &str) -> mongodb::error::Result<i64> {
        Ok(*self.next_ids(sequence, 1).await?.start())
    }

    pub async fn start_session(&self) -> mongodb::error::Result<ClientSession> {
        self.client.start_session().await
    }

    /// Handle that has not talked to a server yet. Lets routing tests build
    /// the app without a live database.
    #[cfg(test)]
    pub async fn lazy(uri: &str) -> mongodb::error::Result<Self> {
        let client = Client::with_uri_str(uri).await?;
        let db = client.database("fridge_test");
        Ok(Self { client, db })
    }

    /// Live database named by `DATABASE_URL`, for `#[ignore]`d tests.
    #[cfg(test)]
    pub async fn connect_for_tests() -> mongodb::error::Result<Self> {
        dotenv::dotenv().ok();
        let uri = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "mongodb://localhost:27017/fridge_test".to_string());
        Self::new(&uri).await
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }

    pub async fn ping(&self) -> mongodb::error::Result<()> {
        self.db.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }
}

fn counter_value(counter: Option<&Document>) -> Option<i64> {
    match counter?.get("seq")? {
        Bson::Int64(n) => Some(*n),
        Bson::Int32(n) => Some(i64::from(*n)),
        _ => None,
    }
}

fn sequence_range(last: i64, step: i64) -> RangeInclusive<i64> {
    (last - step + 1)..=last
}
