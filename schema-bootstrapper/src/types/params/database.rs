use crate::cli::database::mongodb::MongoDBCliArgs;
use crate::error::BootstrapperError;
use std::time::Duration;

const MONGODB_SCHEMES: [&str; 2] = ["mongodb://", "mongodb+srv://"];

/// Validated MongoDB parameters
#[derive(Debug, Clone)]
pub struct DatabaseArgs {
    pub connection_uri: String,
    pub database_name: String,
    pub connect_timeout: Duration,
}

impl TryFrom<MongoDBCliArgs> for DatabaseArgs {
    type Error = BootstrapperError;

    fn try_from(args: MongoDBCliArgs) -> Result<Self, Self::Error> {
        let connection_uri = args
            .mongodb_connection_url
            .filter(|uri| !uri.trim().is_empty())
            .ok_or_else(|| BootstrapperError::ConfigError("MongoDB connection URL is required".to_string()))?;
        if !MONGODB_SCHEMES.iter().any(|scheme| connection_uri.starts_with(scheme)) {
            return Err(BootstrapperError::ConfigError(format!(
                "MongoDB connection URL must start with one of {:?}",
                MONGODB_SCHEMES
            )));
        }

        let database_name = args
            .mongodb_database_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| BootstrapperError::ConfigError("MongoDB database name is required".to_string()))?;

        if args.connect_timeout_secs == 0 {
            return Err(BootstrapperError::ConfigError("connect timeout must be greater than zero".to_string()));
        }

        Ok(Self { connection_uri, database_name, connect_timeout: Duration::from_secs(args.connect_timeout_secs) })
    }
}

/// Validates a collection name against the rules MongoDB enforces on user collections.
pub fn validate_collection_name(name: &str) -> Result<&str, BootstrapperError> {
    if name.trim().is_empty() {
        return Err(BootstrapperError::ConfigError("collection name must not be empty".to_string()));
    }
    if name.starts_with("system.") {
        return Err(BootstrapperError::ConfigError(format!("collection name {name} is reserved")));
    }
    if name.contains('$') || name.contains('\0') {
        return Err(BootstrapperError::ConfigError(format!("collection name {name} contains an invalid character")));
    }
    Ok(name)
}
