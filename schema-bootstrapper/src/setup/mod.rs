use crate::cli::SetupCmd;
use crate::core::client::{DatabaseClient, MongoDbClient};
use crate::error::{BootstrapperError, BootstrapperResult};
use crate::setup::indexes::get_index_models;
use crate::types::params::database::{validate_collection_name, DatabaseArgs};
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub mod indexes;
pub mod verify;

pub use verify::{verify, verify_indexes, VerifyReport};

/// Point in time by which a run has to finish, together with the budget it was derived from.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: tokio::time::Instant,
    budget: Duration,
}

impl Deadline {
    pub fn after(budget: Duration) -> Self {
        Self { at: tokio::time::Instant::now() + budget, budget }
    }
}

/// Runs `fut` to completion, or until `deadline` passes. On expiry the budget is returned.
async fn within<F: Future>(deadline: Option<Deadline>, fut: F) -> Result<F::Output, Duration> {
    match deadline {
        Some(deadline) => tokio::time::timeout_at(deadline.at, fut).await.map_err(|_| deadline.budget),
        None => Ok(fut.await),
    }
}

/// Setup function that connects with the `setup` command's parameters and bootstraps the collection
pub async fn setup(setup_cmd: &SetupCmd) -> BootstrapperResult<VerifyReport> {
    let database_args = DatabaseArgs::try_from(setup_cmd.mongodb_args.clone())?;
    let collection = validate_collection_name(&setup_cmd.collection)?;
    if setup_cmd.timeout == Some(0) {
        return Err(BootstrapperError::ConfigError("timeout must be greater than zero".to_string()));
    }
    debug!(database = %database_args.database_name, collection, "Database params validated");

    let deadline = setup_cmd.timeout.map(|secs| Deadline::after(Duration::from_secs(secs)));
    let client = within(deadline, MongoDbClient::new(&database_args)).await.map_err(BootstrapperError::Timeout)??;
    info!(database = %database_args.database_name, "Connected to MongoDB");

    bootstrap_within(&client, collection, deadline).await
}

/// Drops `collection` and recreates it with the scraped data index set.
///
/// Every document in the collection is deleted. The server is pinged first, so an unreachable
/// database fails before anything is touched. Once the drop succeeded, any failure is reported
/// as a partial bootstrap (see [`BootstrapperError::is_partial`]).
pub async fn bootstrap<C>(client: &C, collection: &str) -> BootstrapperResult<VerifyReport>
where
    C: DatabaseClient + ?Sized,
{
    bootstrap_within(client, collection, None).await
}

/// Same as [`bootstrap`], bounded by `deadline`.
///
/// Expiry before the drop completed is a [`BootstrapperError::Timeout`], expiry after it a
/// [`BootstrapperError::PartialBootstrap`].
#[tracing::instrument(skip(client, deadline))]
pub async fn bootstrap_within<C>(
    client: &C,
    collection: &str,
    deadline: Option<Deadline>,
) -> BootstrapperResult<VerifyReport>
where
    C: DatabaseClient + ?Sized,
{
    let start = Instant::now();
    within(deadline, client.ping()).await.map_err(BootstrapperError::Timeout)??;

    warn!(collection, "Dropping collection, all existing documents will be deleted");
    within(deadline, client.drop_collection(collection)).await.map_err(BootstrapperError::Timeout)??;

    let timed_out_after_drop = |budget: Duration| BootstrapperError::PartialBootstrap {
        collection: collection.to_string(),
        reason: format!("timed out after drop, budget was {budget:?}"),
    };

    within(deadline, client.create_indexes(collection, get_index_models()))
        .await
        .map_err(timed_out_after_drop)?
        .map_err(|source| BootstrapperError::IndexCreationFailed { collection: collection.to_string(), source })?;

    let report = within(deadline, verify_indexes(client, collection))
        .await
        .map_err(timed_out_after_drop)?
        .map_err(|e| BootstrapperError::PartialBootstrap {
            collection: collection.to_string(),
            reason: format!("could not read back the index set: {e}"),
        })?;
    if !report.is_ok() {
        return Err(BootstrapperError::PartialBootstrap { collection: collection.to_string(), reason: report.to_string() });
    }

    info!(
        collection,
        indexes = indexes::SCRAPED_DATA_INDEXES.len(),
        duration_ms = %start.elapsed().as_millis(),
        "Collection bootstrapped"
    );
    Ok(report)
}
