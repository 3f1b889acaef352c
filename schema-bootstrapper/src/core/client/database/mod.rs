pub mod constant;
pub mod error;
pub mod mongodb;

use async_trait::async_trait;
pub use error::DatabaseError;
use ::mongodb::IndexModel;

/// Trait defining the database operations the bootstrap needs
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    /// ping - Check that the server is reachable
    async fn ping(&self) -> Result<(), DatabaseError>;

    /// drop_collection - Drop a collection and every document and index in it.
    /// Dropping a collection that does not exist succeeds.
    async fn drop_collection(&self, collection: &str) -> Result<(), DatabaseError>;

    /// create_indexes - Create the given indexes, implicitly creating the collection
    async fn create_indexes(&self, collection: &str, indexes: Vec<IndexModel>) -> Result<(), DatabaseError>;

    /// list_indexes - List every index on a collection, `_id_` included
    async fn list_indexes(&self, collection: &str) -> Result<Vec<IndexModel>, DatabaseError>;

    /// count_documents - Count all documents in a collection
    async fn count_documents(&self, collection: &str) -> Result<u64, DatabaseError>;
}
