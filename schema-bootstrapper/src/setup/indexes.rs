//! Index definitions for the scraped_data collection.
//!
//! Indexes:
//! - `{ "_id": 1 }` - Primary key (automatic)
//! - `{ "url": 1 }` unique - Dedup key for scraped content
//! - `{ "config_id": 1 }` - Lookup by scrape-job configuration
//! - `{ "scraper_id": 1 }` - Lookup by originating scraper
//! - `{ "data_type": 1 }` - Lookup by content classification
//! - `{ "created_at": 1 }` - Time-range queries on insertion time
//! - `{ "updated_at": 1 }` - Time-range queries on last modification

use crate::core::client::database::constant::{
    CONFIG_ID_FIELD, CREATED_AT_FIELD, DATA_TYPE_FIELD, SCRAPER_ID_FIELD, UPDATED_AT_FIELD, URL_FIELD,
};
use mongodb::bson::{Bson, Document};
use mongodb::options::IndexOptions;
use mongodb::IndexModel;

/// A single-field ascending index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexSpec {
    pub field: &'static str,
    pub unique: bool,
}

pub const SCRAPED_DATA_INDEXES: [IndexSpec; 6] = [
    IndexSpec { field: URL_FIELD, unique: true },
    IndexSpec { field: CONFIG_ID_FIELD, unique: false },
    IndexSpec { field: SCRAPER_ID_FIELD, unique: false },
    IndexSpec { field: DATA_TYPE_FIELD, unique: false },
    IndexSpec { field: CREATED_AT_FIELD, unique: false },
    IndexSpec { field: UPDATED_AT_FIELD, unique: false },
];

impl IndexSpec {
    /// Name the server assigns to this index when none is given.
    pub fn name(&self) -> String {
        format!("{}_1", self.field)
    }

    pub fn keys(&self) -> Document {
        let mut keys = Document::new();
        keys.insert(self.field, 1);
        keys
    }

    pub fn to_model(&self) -> IndexModel {
        let builder = IndexModel::builder().keys(self.keys());
        if self.unique {
            builder.options(IndexOptions::builder().unique(true).build()).build()
        } else {
            builder.build()
        }
    }

    /// Whether an index read back from the server is the one described by this spec.
    pub fn matches(&self, model: &IndexModel) -> bool {
        self.covers_keys(model) && is_unique(model) == self.unique
    }

    /// Whether `model` is built on the same key pattern, whatever its options.
    pub fn covers_keys(&self, model: &IndexModel) -> bool {
        same_keys(&self.keys(), &model.keys)
    }
}

pub fn get_index_models() -> Vec<IndexModel> {
    SCRAPED_DATA_INDEXES.iter().map(IndexSpec::to_model).collect()
}

pub(crate) fn index_name(model: &IndexModel) -> String {
    model.options.as_ref().and_then(|o| o.name.clone()).unwrap_or_else(|| default_index_name(&model.keys))
}

pub(crate) fn is_unique(model: &IndexModel) -> bool {
    model.options.as_ref().and_then(|o| o.unique).unwrap_or(false)
}

fn default_index_name(keys: &Document) -> String {
    keys.iter()
        .map(|(field, direction)| format!("{}_{}", field, direction_label(direction)))
        .collect::<Vec<_>>()
        .join("_")
}

// The server may hand back the direction as int32, int64 or double.
fn direction_label(direction: &Bson) -> String {
    match direction {
        Bson::Int32(v) => v.to_string(),
        Bson::Int64(v) => v.to_string(),
        Bson::Double(v) => (*v as i64).to_string(),
        Bson::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn same_keys(expected: &Document, actual: &Document) -> bool {
    expected.len() == actual.len()
        && expected
            .iter()
            .zip(actual.iter())
            .all(|((expected_field, expected_dir), (actual_field, actual_dir))| {
                expected_field == actual_field && direction_label(expected_dir) == direction_label(actual_dir)
            })
}
