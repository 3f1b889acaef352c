use clap::Args;

/// Parameters used to config MongoDB.
#[derive(Debug, Clone, Args)]
pub struct MongoDBCliArgs {
    /// The connection string to the MongoDB server.
    #[arg(env = "MONGODB_URI", long, default_value = Some("mongodb://localhost:27017"))]
    pub mongodb_connection_url: Option<String>,

    /// The name of the database holding the scraped data.
    #[arg(env = "MONGO_INITDB_DATABASE", long)]
    pub mongodb_database_name: Option<String>,

    /// Seconds to wait for the server before giving up on the connection.
    #[arg(env = "SCHEMA_BOOTSTRAPPER_CONNECT_TIMEOUT", long = "connect-timeout", default_value_t = 10)]
    pub connect_timeout_secs: u64,
}
