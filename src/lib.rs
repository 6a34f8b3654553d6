#![deny(clippy::all)]
#![warn(clippy::pedantic, clippy::nursery, clippy::cargo)]

//! Per-device Symmetrix FAST VP report.
//!
//! Thin device capacity, pool binding, storage group membership and FAST
//! policy data are queried from SYMCLI, correlated per device, and rendered
//! as one table.

pub mod aggregate;
mod error;
pub mod feed;
pub mod parse;
pub mod policy;
pub mod pool;
pub mod report;
pub mod source;

use std::collections::HashMap;

use anyhow::{Context, Result};
use tracing::warn;

pub use crate::aggregate::{Aggregate, ThinDevice};
pub use crate::error::Error;
pub use crate::feed::Feed;
pub use crate::parse::{DeviceCapacity, PoolAllocation, StorageGroup};
pub use crate::policy::{FastPolicy, TierProfile};
pub use crate::pool::PoolTech;
pub use crate::report::{Columns, Format, Table};
pub use crate::source::{Source, Symcli, XmlDir};

/// The five feeds, parsed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Inventory {
    pub devices: Vec<DeviceCapacity>,
    pub associations: HashMap<String, String>,
    pub policies: HashMap<String, TierProfile>,
    pub groups: Vec<StorageGroup>,
    pub pools: HashMap<String, PoolTech>,
}

impl Inventory {
    /// Queries every feed from `source`, one after another, and parses the
    /// results.
    ///
    /// # Errors
    ///
    /// Returns an error on the first feed that cannot be queried or parsed.
    pub fn collect(source: &dyn Source) -> Result<Self> {
        let xml = |feed: Feed| {
            source
                .query(feed)
                .with_context(|| format!("querying {} data", feed))
        };

        Ok(Self {
            devices: parse::thin_devices(&xml(Feed::ThinDevices)?)?,
            associations: parse::fast_associations(&xml(
                Feed::FastAssociations,
            )?)?,
            policies: parse::fast_policies(&xml(Feed::FastPolicies)?)?,
            groups: parse::storage_groups(&xml(Feed::StorageGroups)?)?,
            pools: parse::pools(&xml(Feed::Pools)?)?,
        })
    }

    /// Correlates the feeds per device.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DataConsistency`] if a device is allocated in a pool
    /// missing from the pool inventory.
    pub fn aggregate(&self) -> Result<Aggregate, Error> {
        Aggregate::build(
            &self.devices,
            &self.groups,
            &self.associations,
            &self.pools,
        )
    }
}

/// How a report is laid out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Options {
    pub format: Format,
    pub columns: Columns,
}

/// Queries `source` and renders the complete report.
///
/// # Errors
///
/// Returns an error if querying, parsing or correlating the feeds fails.
pub fn run(source: &dyn Source, options: Options) -> Result<String> {
    let inventory = Inventory::collect(source)?;

    let aggregate = inventory
        .aggregate()
        .with_context(|| "correlating thin device data")?;

    if aggregate.is_empty() {
        warn!("no thin devices reported");
    }

    let table = Table::new(&aggregate, &inventory.policies, options.columns);

    let report = table
        .render(options.format)
        .with_context(|| "rendering report")?;

    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    /// Serves canned documents and remembers what was asked for.
    #[derive(Default)]
    struct Canned {
        docs: HashMap<Feed, String>,
        queried: RefCell<Vec<Feed>>,
    }

    impl Canned {
        fn with(mut self, feed: Feed, xml: &str) -> Self {
            self.docs.insert(feed, xml.into());
            self
        }
    }

    impl Source for Canned {
        fn query(&self, feed: Feed) -> Result<String> {
            self.queried.borrow_mut().push(feed);

            self.docs
                .get(&feed)
                .cloned()
                .with_context(|| format!("no canned {} document", feed))
        }
    }

    fn array() -> Canned {
        Canned::default()
            .with(
                Feed::ThinDevices,
                concat!(
                    "<SymCLI_ML><Symmetrix><ThinDevs>\n",
                    "  <Device><dev_name>DEV001</dev_name>",
                    "<total_tracks_gb>100.0</total_tracks_gb>",
                    "<alloc_tracks_gb>40.0</alloc_tracks_gb>",
                    "<pool><pool_name>POOL_A</pool_name>",
                    "<alloc_tracks_gb>40.0</alloc_tracks_gb>",
                    "<tdev_status>Bound</tdev_status></pool></Device>\n",
                    "</ThinDevs></Symmetrix></SymCLI_ML>\n",
                ),
            )
            .with(
                Feed::FastAssociations,
                concat!(
                    "<SymCLI_ML><Symmetrix><Fast_Association>",
                    "<Association_Info><sg_name>SG1</sg_name>",
                    "<policy_name>Gold</policy_name></Association_Info>",
                    "</Fast_Association></Symmetrix></SymCLI_ML>\n",
                ),
            )
            .with(
                Feed::FastPolicies,
                concat!(
                    "<SymCLI_ML><Symmetrix><Fast_Policy>",
                    "<Policy_Info><policy_name>Gold</policy_name></Policy_Info>",
                    "<Tier><tier_tech>EFD</tier_tech><tier_max_sg_per>30</tier_max_sg_per></Tier>",
                    "<Tier><tier_tech>FC</tier_tech><tier_max_sg_per>50</tier_max_sg_per></Tier>",
                    "<Tier><tier_tech>SATA</tier_tech><tier_max_sg_per>20</tier_max_sg_per></Tier>",
                    "</Fast_Policy></Symmetrix></SymCLI_ML>\n",
                ),
            )
            .with(
                Feed::StorageGroups,
                concat!(
                    "<SymCLI_ML><SG>",
                    "<SG_Info><name>SG1</name><FAST_Policy>Yes</FAST_Policy></SG_Info>",
                    "<DEVS_List><Device><dev_name>DEV001</dev_name></Device>",
                    "<Device><dev_name>DEV999</dev_name></Device></DEVS_List>",
                    "</SG></SymCLI_ML>\n",
                ),
            )
            .with(
                Feed::Pools,
                concat!(
                    "<SymCLI_ML><Symmetrix><DevicePool>",
                    "<pool_name>POOL_A</pool_name><technology>EFD</technology>",
                    "</DevicePool></Symmetrix></SymCLI_ML>\n",
                ),
            )
    }

    #[test]
    fn report_end_to_end() {
        let source = array();

        let options = Options {
            format: Format::Csv,
            ..Options::default()
        };

        let csv = concat!(
            "TDEV,TotalGB,AllocGB,BoundPool,FastSG,FastPolicy,Policy%,POOL_A\n",
            "DEV001,100.0,40.0,POOL_A,SG1,Gold,30/50/20,40.0\n",
        );

        assert_eq!(run(&source, options).unwrap(), csv);
        assert_eq!(*source.queried.borrow(), Feed::ALL);
    }

    #[test]
    fn failing_query_aborts_before_later_feeds() {
        let mut source = array();
        source.docs.remove(&Feed::FastPolicies);

        let err = run(&source, Options::default()).unwrap_err();

        assert_eq!(err.to_string(), "querying FAST policy data");
        assert_eq!(
            *source.queried.borrow(),
            [
                Feed::ThinDevices,
                Feed::FastAssociations,
                Feed::FastPolicies,
            ]
        );
    }

    #[test]
    fn pool_missing_from_inventory_aborts() {
        let source = array().with(
            Feed::Pools,
            "<SymCLI_ML><Symmetrix></Symmetrix></SymCLI_ML>",
        );

        let err = run(&source, Options::default()).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::DataConsistency { pool }) if pool == "POOL_A"
        ));
    }

    #[test]
    fn empty_array_renders_header_only() {
        let source = array().with(
            Feed::ThinDevices,
            "<SymCLI_ML><Symmetrix><ThinDevs></ThinDevs></Symmetrix></SymCLI_ML>",
        );

        let options = Options {
            format: Format::Csv,
            ..Options::default()
        };

        assert_eq!(
            run(&source, options).unwrap(),
            "TDEV,TotalGB,AllocGB,BoundPool,FastSG,FastPolicy,Policy%\n"
        );
    }
}
