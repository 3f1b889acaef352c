use crate::cli::VerifyCmd;
use crate::core::client::database::constant::ID_INDEX_NAME;
use crate::core::client::{DatabaseClient, MongoDbClient};
use crate::error::{BootstrapperError, BootstrapperResult};
use crate::setup::indexes::{index_name, SCRAPED_DATA_INDEXES};
use crate::types::params::database::{validate_collection_name, DatabaseArgs};
use mongodb::IndexModel;
use std::fmt;
use tracing::{info, warn};

/// Outcome of comparing a collection's indexes with the expected index set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifyReport {
    pub collection: String,
    /// Expected indexes with no index on the same keys
    pub missing: Vec<String>,
    /// Indexes on the collection that are not part of the expected set
    pub unexpected: Vec<String>,
    /// Expected indexes present on the right keys but with different uniqueness
    pub mismatched: Vec<String>,
    pub document_count: u64,
}

impl VerifyReport {
    pub fn is_ok(&self) -> bool {
        self.missing.is_empty() && self.unexpected.is_empty() && self.mismatched.is_empty()
    }
}

impl fmt::Display for VerifyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "missing={:?}, unexpected={:?}, mismatched={:?}, documents={}",
            self.missing, self.unexpected, self.mismatched, self.document_count
        )
    }
}

fn is_id_index(model: &IndexModel) -> bool {
    index_name(model) == ID_INDEX_NAME || (model.keys.len() == 1 && model.keys.contains_key("_id"))
}

/// Compares the secondary indexes of `collection` with the expected set.
/// Nothing on the server is modified.
#[tracing::instrument(skip(client))]
pub async fn verify_indexes<C>(client: &C, collection: &str) -> BootstrapperResult<VerifyReport>
where
    C: DatabaseClient + ?Sized,
{
    let mut secondary: Vec<_> = client
        .list_indexes(collection)
        .await?
        .into_iter()
        .filter(|model| !is_id_index(model))
        .collect();

    let mut report = VerifyReport { collection: collection.to_string(), ..Default::default() };
    for spec in SCRAPED_DATA_INDEXES.iter() {
        match secondary.iter().position(|model| spec.covers_keys(model)) {
            Some(pos) => {
                let model = secondary.remove(pos);
                if !spec.matches(&model) {
                    report.mismatched.push(spec.name());
                }
            }
            None => report.missing.push(spec.name()),
        }
    }
    report.unexpected = secondary.iter().map(index_name).collect();
    report.document_count = client.count_documents(collection).await?;

    Ok(report)
}

/// Connects with the `verify` command's parameters and checks the collection.
pub async fn verify(verify_cmd: &VerifyCmd) -> BootstrapperResult<VerifyReport> {
    let database_args = DatabaseArgs::try_from(verify_cmd.mongodb_args.clone())?;
    let collection = validate_collection_name(&verify_cmd.collection)?;

    let client = MongoDbClient::new(&database_args).await?;
    let report = verify_indexes(&client, collection).await?;

    if report.is_ok() {
        info!(collection, documents = report.document_count, "Collection matches the expected index set");
        Ok(report)
    } else {
        warn!(collection, report = %report, "Collection does not match the expected index set");
        Err(BootstrapperError::VerificationFailed { collection: collection.to_string(), details: report.to_string() })
    }
}
