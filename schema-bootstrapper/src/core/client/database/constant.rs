/// Collection holding all raw data fetched during the crawl step.
pub const SCRAPED_DATA_COLLECTION: &str = "scraped_data";

/// Name MongoDB gives the index it maintains on `_id` for every collection.
pub const ID_INDEX_NAME: &str = "_id_";

pub const URL_FIELD: &str = "url";
pub const CONFIG_ID_FIELD: &str = "config_id";
pub const SCRAPER_ID_FIELD: &str = "scraper_id";
pub const DATA_TYPE_FIELD: &str = "data_type";
pub const CREATED_AT_FIELD: &str = "created_at";
pub const UPDATED_AT_FIELD: &str = "updated_at";

/// Server error codes reported when a requested index clashes with an existing one.
pub const INDEX_OPTIONS_CONFLICT_CODE: i32 = 85;
pub const INDEX_KEY_SPECS_CONFLICT_CODE: i32 = 86;

/// Server error code for an operation on a collection that does not exist.
pub const NAMESPACE_NOT_FOUND_CODE: i32 = 26;

/// Server error code for a unique index violation.
pub const DUPLICATE_KEY_CODE: i32 = 11000;
