use clap::{Args, Parser, Subcommand};

use crate::core::client::database::constant::SCRAPED_DATA_COLLECTION;

pub mod database;

#[derive(Parser, Debug)]
#[command(
    name = "schema-bootstrapper",
    version,
    about = "Bootstraps the scraped_data collection and its indexes",
    long_about = "Drops the scraped_data collection and recreates it with its index set.\n\n\
    WARNING: `setup` deletes every document in the collection on each run.",
    after_help = "Examples:\n  \
    schema-bootstrapper setup --mongodb-database-name crops\n  \
    MONGODB_URI=mongodb://mongo:27017 MONGO_INITDB_DATABASE=crops schema-bootstrapper verify"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Drop the collection and recreate its indexes
    Setup {
        #[command(flatten)]
        setup_command: Box<SetupCmd>,
    },
    /// Check the collection's indexes without modifying anything
    Verify {
        #[command(flatten)]
        verify_command: Box<VerifyCmd>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct SetupCmd {
    #[clap(flatten)]
    pub mongodb_args: database::mongodb::MongoDBCliArgs,

    /// Name of the collection to bootstrap.
    #[arg(env = "SCHEMA_BOOTSTRAPPER_COLLECTION", long, default_value = SCRAPED_DATA_COLLECTION)]
    pub collection: String,

    /// Upper bound in seconds for the whole run.
    #[arg(
        env = "SCHEMA_BOOTSTRAPPER_TIMEOUT",
        long,
        default_value = Some("300"),
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout: Option<u64>,
}

#[derive(Args, Debug, Clone)]
pub struct VerifyCmd {
    #[clap(flatten)]
    pub mongodb_args: database::mongodb::MongoDBCliArgs,

    /// Name of the collection to check.
    #[arg(env = "SCHEMA_BOOTSTRAPPER_COLLECTION", long, default_value = SCRAPED_DATA_COLLECTION)]
    pub collection: String,
}
