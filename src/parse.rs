//! Typed records from SYMCLI `-output xml_e` documents.

use std::collections::HashMap;
use std::str::FromStr;

use roxmltree::{Document, Node, ParsingOptions};
use tracing::debug;

use crate::error::{Error, Result};
use crate::feed::Feed;
use crate::policy::TierProfile;
use crate::pool::PoolTech;

/// One `Device` entry of `symcfg list -tdev -detail`.
#[derive(Clone, Debug, PartialEq)]
pub struct DeviceCapacity {
    pub name: String,
    pub total_gb: f64,
    pub allocated_gb: f64,
    pub written_gb: Option<f64>,
    pub pools: Vec<PoolAllocation>,
}

/// Allocation of a thin device within one pool.
#[derive(Clone, Debug, PartialEq)]
pub struct PoolAllocation {
    pub pool: String,
    pub allocated_gb: f64,
    pub bound: bool,
}

/// One `SG` entry of `symsg list -v`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageGroup {
    pub name: String,
    pub fast_managed: bool,
    pub devices: Vec<String>,
}

/// Parses the thin device capacity feed.
///
/// # Errors
///
/// Returns an error if the document is not XML or a device lacks a name or
/// capacity.
pub fn thin_devices(xml: &str) -> Result<Vec<DeviceCapacity>> {
    let feed = Feed::ThinDevices;
    let doc = document(feed, xml)?;

    let devices = find_all(doc.root_element(), "Symmetrix/ThinDevs/Device")
        .into_iter()
        .enumerate()
        .map(|(i, node)| {
            let record = Record::new(feed, i, node);
            let name = record.text("dev_name")?;
            let record = record.named(name);

            let pools = find_all(node, "pool")
                .into_iter()
                .enumerate()
                .map(|(j, pool)| {
                    let record = record.nested("pool", j, pool);

                    Ok(PoolAllocation {
                        pool: record.text("pool_name")?.into(),
                        allocated_gb: record.number("alloc_tracks_gb")?,
                        bound: record.marker("tdev_status")? == "Bound",
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            Ok(DeviceCapacity {
                name: name.into(),
                total_gb: record.number("total_tracks_gb")?,
                allocated_gb: record.number("alloc_tracks_gb")?,
                written_gb: record.optional_number("written_tracks_gb")?,
                pools,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(%feed, records = devices.len(), "parsed");

    Ok(devices)
}

/// Parses the FAST association feed into storage group → policy name.
///
/// # Errors
///
/// Returns an error if the document is not XML or an association lacks a
/// field.
pub fn fast_associations(xml: &str) -> Result<HashMap<String, String>> {
    let feed = Feed::FastAssociations;
    let doc = document(feed, xml)?;

    let associations = find_all(
        doc.root_element(),
        "Symmetrix/Fast_Association/Association_Info",
    )
    .into_iter()
    .enumerate()
    .map(|(i, node)| {
        let record = Record::new(feed, i, node);
        let sg = record.text("sg_name")?;
        let record = record.named(sg);

        Ok((sg.to_owned(), record.text("policy_name")?.to_owned()))
    })
    .collect::<Result<HashMap<_, _>>>()?;

    debug!(%feed, records = associations.len(), "parsed");

    Ok(associations)
}

/// Parses the FAST policy feed into policy name → tier profile.
///
/// # Errors
///
/// Returns an error if the document is not XML, a policy lacks a name, or a
/// tier lacks its technology or a numeric percentage.
pub fn fast_policies(xml: &str) -> Result<HashMap<String, TierProfile>> {
    let feed = Feed::FastPolicies;
    let doc = document(feed, xml)?;

    let policies = find_all(doc.root_element(), "Symmetrix/Fast_Policy")
        .into_iter()
        .enumerate()
        .map(|(i, node)| {
            let record = Record::new(feed, i, node);
            let name = record.text("Policy_Info/policy_name")?;
            let record = record.named(name);

            let mut profile = TierProfile::default();

            for (j, tier) in find_all(node, "Tier").into_iter().enumerate() {
                let record = record.nested("tier", j, tier);
                let tech = record.text("tier_tech")?;
                let percent = record.number::<u32>("tier_max_sg_per")?;

                if !profile.set(tech, percent) {
                    debug!(policy = name, tech, "ignoring tier");
                }
            }

            Ok((name.to_owned(), profile))
        })
        .collect::<Result<HashMap<_, _>>>()?;

    debug!(%feed, records = policies.len(), "parsed");

    Ok(policies)
}

/// Parses the storage group feed.
///
/// # Errors
///
/// Returns an error if the document is not XML, a group lacks its name or
/// FAST flag, or a member lacks its device name.
pub fn storage_groups(xml: &str) -> Result<Vec<StorageGroup>> {
    let feed = Feed::StorageGroups;
    let doc = document(feed, xml)?;

    let groups = find_all(doc.root_element(), "SG")
        .into_iter()
        .enumerate()
        .map(|(i, node)| {
            let record = Record::new(feed, i, node);
            let name = record.text("SG_Info/name")?;
            let record = record.named(name);

            let devices = find_all(node, "DEVS_List/Device")
                .into_iter()
                .enumerate()
                .map(|(j, member)| {
                    record
                        .nested("member", j, member)
                        .text("dev_name")
                        .map(String::from)
                })
                .collect::<Result<Vec<_>>>()?;

            Ok(StorageGroup {
                name: name.into(),
                fast_managed: record.marker("SG_Info/FAST_Policy")? == "Yes",
                devices,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(%feed, records = groups.len(), "parsed");

    Ok(groups)
}

/// Parses the pool inventory into pool name → technology.
///
/// # Errors
///
/// Returns an error if the document is not XML or a pool lacks its name or
/// technology.
pub fn pools(xml: &str) -> Result<HashMap<String, PoolTech>> {
    let feed = Feed::Pools;
    let doc = document(feed, xml)?;

    let pools = find_all(doc.root_element(), "Symmetrix/DevicePool")
        .into_iter()
        .enumerate()
        .map(|(i, node)| {
            let record = Record::new(feed, i, node);
            let name = record.text("pool_name")?;
            let record = record.named(name);

            let tech = PoolTech::from(record.text("technology")?);

            Ok((name.to_owned(), tech))
        })
        .collect::<Result<HashMap<_, _>>>()?;

    debug!(%feed, records = pools.len(), "parsed");

    Ok(pools)
}

fn document(feed: Feed, xml: &str) -> Result<Document<'_>> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };

    Document::parse_with_options(xml, options)
        .map_err(|source| Error::Xml { feed, source })
}

/// Element children of `node` along a `/`-separated tag path.
fn find_all<'a, 'input>(
    node: Node<'a, 'input>,
    path: &str,
) -> Vec<Node<'a, 'input>> {
    let mut nodes = vec![node];

    for tag in path.split('/') {
        nodes = nodes
            .iter()
            .flat_map(|node| {
                node.children().filter(move |child| child.has_tag_name(tag))
            })
            .collect();
    }

    nodes
}

/// An element being parsed, with enough identity for error messages.
struct Record<'a, 'input> {
    feed: Feed,
    id: String,
    node: Node<'a, 'input>,
}

impl<'a, 'input> Record<'a, 'input> {
    fn new(feed: Feed, index: usize, node: Node<'a, 'input>) -> Self {
        Self {
            feed,
            id: format!("#{}", index + 1),
            node,
        }
    }

    fn named(self, name: &str) -> Self {
        Self {
            id: format!("{} ({})", self.id, name),
            ..self
        }
    }

    fn nested(&self, kind: &str, index: usize, node: Node<'a, 'input>) -> Self {
        Self {
            feed: self.feed,
            id: format!("{} {} #{}", self.id, kind, index + 1),
            node,
        }
    }

    fn error(&self, reason: String) -> Error {
        Error::Parse {
            feed: self.feed,
            record: self.id.clone(),
            reason,
        }
    }

    fn optional_text(&self, path: &str) -> Option<&'a str> {
        find_all(self.node, path)
            .first()
            .and_then(Node::text)
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }

    fn text(&self, path: &str) -> Result<&'a str> {
        self.optional_text(path)
            .ok_or_else(|| self.error(format!("missing {}", path)))
    }

    /// Text of a flag element that has to be present but may be empty.
    fn marker(&self, path: &str) -> Result<&'a str> {
        find_all(self.node, path)
            .first()
            .map(|node| node.text().map_or("", str::trim))
            .ok_or_else(|| self.error(format!("missing {}", path)))
    }

    fn optional_number<T>(&self, path: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional_text(path)
            .map(|text| {
                text.parse::<T>().map_err(|e| {
                    self.error(format!("parsing {} value {:?}: {}", path, text, e))
                })
            })
            .transpose()
    }

    fn number<T>(&self, path: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional_number(path)?
            .ok_or_else(|| self.error(format!("missing {}", path)))
    }
}
