use std::collections::HashMap;

use crate::error::{Error, Result};

/// Pool name SYMCLI reports for allocations outside any pool.
pub const UNPOOLED: &str = "N/A";

/// Storage technology of a thin pool, as reported by `symcfg list -pool`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PoolTech {
    Efd,
    Fc,
    Sata,
    Other(String),
}

impl PoolTech {
    /// Column group rank: EFD pools first, then FC, SATA and the rest.
    #[must_use]
    pub const fn rank(&self) -> u8 {
        match self {
            Self::Efd => 0,
            Self::Fc => 1,
            Self::Sata => 2,
            Self::Other(_) => 3,
        }
    }
}

impl From<&str> for PoolTech {
    fn from(tech: &str) -> Self {
        match tech {
            "EFD" => Self::Efd,
            "FC" => Self::Fc,
            "SATA" => Self::Sata,
            other => Self::Other(other.into()),
        }
    }
}

/// Orders pools for report columns.
///
/// Pools are grouped by technology (EFD, FC, SATA, anything else) and sorted
/// by name within each group. Duplicates are collapsed.
///
/// # Errors
///
/// Returns [`Error::DataConsistency`] if a pool has no entry in `techs`.
pub fn order_pools<I, S>(
    pools: I,
    techs: &HashMap<String, PoolTech>,
) -> Result<Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut ranked = pools
        .into_iter()
        .map(|pool| {
            let pool = pool.as_ref();

            let tech = techs.get(pool).ok_or_else(|| Error::DataConsistency {
                pool: pool.into(),
            })?;

            Ok((tech.rank(), pool.to_owned()))
        })
        .collect::<Result<Vec<_>>>()?;

    ranked.sort();
    ranked.dedup();

    Ok(ranked.into_iter().map(|(_, pool)| pool).collect())
}
