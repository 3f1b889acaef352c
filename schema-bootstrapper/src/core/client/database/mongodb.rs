use super::error::{is_namespace_not_found, DatabaseError};
use crate::core::client::database::DatabaseClient;
use crate::types::params::database::DatabaseArgs;
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection, Database, IndexModel};
use std::time::Instant;
use tracing::debug;

/// MongoDB client implementation
pub struct MongoDbClient {
    client: Client,
    database: Database,
}

impl MongoDbClient {
    /// Connects to the server described by `config` and pings it before returning,
    /// so an unreachable server is reported here rather than on the first destructive call.
    pub async fn new(config: &DatabaseArgs) -> Result<Self, DatabaseError> {
        // SRV lookups happen while parsing, so DNS failures surface here
        let mut options =
            ClientOptions::parse(&config.connection_uri).await.map_err(|e| DatabaseError::from_mongo("admin", e))?;
        options.app_name = Some(env!("CARGO_PKG_NAME").to_string());
        options.connect_timeout = Some(config.connect_timeout);
        options.server_selection_timeout = Some(config.connect_timeout);

        let client = Client::with_options(options).map_err(|e| DatabaseError::from_mongo("admin", e))?;
        let database = client.database(&config.database_name);
        let mongo = Self { client, database };
        mongo.ping().await?;
        Ok(mongo)
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    fn get_collection(&self, name: &str) -> Collection<Document> {
        self.database.collection(name)
    }
}

#[async_trait]
impl DatabaseClient for MongoDbClient {
    #[tracing::instrument(skip(self), fields(function_type = "db_call"), err)]
    async fn ping(&self) -> Result<(), DatabaseError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| DatabaseError::from_mongo("admin", e))?;
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(function_type = "db_call"), err)]
    async fn drop_collection(&self, collection: &str) -> Result<(), DatabaseError> {
        let start = Instant::now();
        self.get_collection(collection).drop().await.map_err(|e| DatabaseError::from_mongo(collection, e))?;
        debug!(collection, duration_ms = %start.elapsed().as_millis(), "Collection dropped");
        Ok(())
    }

    #[tracing::instrument(skip(self, indexes), fields(function_type = "db_call", index_count = indexes.len()), err)]
    async fn create_indexes(&self, collection: &str, indexes: Vec<IndexModel>) -> Result<(), DatabaseError> {
        let start = Instant::now();
        let result = self
            .get_collection(collection)
            .create_indexes(indexes)
            .await
            .map_err(|e| DatabaseError::from_mongo(collection, e))?;
        debug!(
            collection,
            indexes = ?result.index_names,
            duration_ms = %start.elapsed().as_millis(),
            "Indexes created"
        );
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(function_type = "db_call"), err)]
    async fn list_indexes(&self, collection: &str) -> Result<Vec<IndexModel>, DatabaseError> {
        let cursor = match self.get_collection(collection).list_indexes().await {
            Ok(cursor) => cursor,
            // a collection that was never created has no indexes
            Err(e) if is_namespace_not_found(&e) => return Ok(Vec::new()),
            Err(e) => return Err(DatabaseError::from_mongo(collection, e)),
        };
        let indexes: Vec<IndexModel> = cursor.try_collect().await.map_err(|e| DatabaseError::from_mongo(collection, e))?;
        Ok(indexes)
    }

    #[tracing::instrument(skip(self), fields(function_type = "db_call"), err)]
    async fn count_documents(&self, collection: &str) -> Result<u64, DatabaseError> {
        self.get_collection(collection)
            .count_documents(doc! {})
            .await
            .map_err(|e| DatabaseError::from_mongo(collection, e))
    }
}
