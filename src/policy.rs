use std::collections::HashMap;
use std::fmt;

/// Shown in place of a FAST policy or its tier split when it cannot be found.
pub const NOT_FOUND: &str = "<NotFound>";

/// FAST policy governing a device, as resolved through its storage group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FastPolicy {
    Named(String),

    /// The storage group is FAST-managed but has no policy association.
    /// Seen with SYMAPI database inconsistencies.
    Unresolved,
}

impl FastPolicy {
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Named(name) => Some(name),
            Self::Unresolved => None,
        }
    }
}

impl fmt::Display for FastPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name().unwrap_or(NOT_FOUND))
    }
}

/// Maximum storage group share per tier of a FAST policy, in percent.
///
/// A tier the policy does not reference is `None`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TierProfile {
    pub efd: Option<u32>,
    pub fc: Option<u32>,
    pub sata: Option<u32>,
}

impl TierProfile {
    /// Records the percentage for the tier named `tech`.
    ///
    /// Only the first value for a tier is kept. Returns `false` if `tech` is
    /// not one of EFD, FC or SATA.
    pub fn set(&mut self, tech: &str, percent: u32) -> bool {
        let slot = match tech {
            "EFD" => &mut self.efd,
            "FC" => &mut self.fc,
            "SATA" => &mut self.sata,
            _ => return false,
        };

        slot.get_or_insert(percent);

        true
    }
}

impl fmt::Display for TierProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.efd.unwrap_or(0),
            self.fc.unwrap_or(0),
            self.sata.unwrap_or(0)
        )
    }
}

/// Returns the `EFD/FC/SATA` split of `policy`, or [`NOT_FOUND`] if the
/// policy is unresolved or has no profile.
#[must_use]
pub fn tier_percentages(
    policy: &FastPolicy,
    profiles: &HashMap<String, TierProfile>,
) -> String {
    policy
        .name()
        .and_then(|name| profiles.get(name))
        .map_or_else(|| NOT_FOUND.into(), ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profiles() -> HashMap<String, TierProfile> {
        let mut gold = TierProfile::default();
        gold.set("EFD", 30);
        gold.set("FC", 50);
        gold.set("SATA", 20);

        let mut bronze = TierProfile::default();
        bronze.set("SATA", 100);

        HashMap::from([("Gold".into(), gold), ("Bronze".into(), bronze)])
    }

    #[test]
    fn resolves_named_policy() {
        let gold = FastPolicy::Named("Gold".into());

        assert_eq!(tier_percentages(&gold, &profiles()), "30/50/20");
    }

    #[test]
    fn unreferenced_tiers_are_zero() {
        let bronze = FastPolicy::Named("Bronze".into());

        assert_eq!(tier_percentages(&bronze, &profiles()), "0/0/100");
    }

    #[test]
    fn unknown_policy_is_not_found() {
        let silver = FastPolicy::Named("Silver".into());

        assert_eq!(tier_percentages(&silver, &profiles()), NOT_FOUND);
        assert_eq!(
            tier_percentages(&FastPolicy::Unresolved, &profiles()),
            NOT_FOUND
        );
    }

    #[test]
    fn policy_literally_named_not_found_is_still_a_name() {
        let mut profiles = profiles();
        profiles.insert(NOT_FOUND.into(), TierProfile::default());

        let named = FastPolicy::Named(NOT_FOUND.into());

        assert_eq!(tier_percentages(&named, &profiles), "0/0/0");
        assert_eq!(FastPolicy::Unresolved.name(), None);
    }

    #[test]
    fn first_tier_entry_wins() {
        let mut profile = TierProfile::default();

        assert!(profile.set("FC", 40));
        assert!(profile.set("FC", 60));
        assert!(!profile.set("SAS", 10));

        assert_eq!(profile.to_string(), "0/40/0");
    }
}
