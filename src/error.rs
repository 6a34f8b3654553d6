use thiserror::Error;

use crate::feed::Feed;

/// Failures of the parsing, aggregation and rendering stages.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{feed} output is not well-formed XML")]
    Xml {
        feed: Feed,
        #[source]
        source: roxmltree::Error,
    },

    #[error("{feed} record {record}: {reason}")]
    Parse {
        feed: Feed,
        record: String,
        reason: String,
    },

    #[error(
        "pool {pool} is referenced by thin device capacity data but missing \
         from the pool inventory"
    )]
    DataConsistency { pool: String },

    #[error("writing report")]
    Format(#[from] std::fmt::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
