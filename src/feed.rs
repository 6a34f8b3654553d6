use std::fmt;

/// The five SYMCLI queries a report is built from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Feed {
    ThinDevices,
    FastAssociations,
    FastPolicies,
    StorageGroups,
    Pools,
}

impl Feed {
    /// All feeds, in the order they are queried.
    pub const ALL: [Self; 5] = [
        Self::ThinDevices,
        Self::FastAssociations,
        Self::FastPolicies,
        Self::StorageGroups,
        Self::Pools,
    ];

    /// The SYMCLI binary answering this feed.
    #[must_use]
    pub const fn program(self) -> &'static str {
        match self {
            Self::ThinDevices | Self::Pools => "symcfg",
            Self::FastAssociations | Self::FastPolicies => "symfast",
            Self::StorageGroups => "symsg",
        }
    }

    /// Arguments following `-sid <SID>`, without the output selector.
    #[must_use]
    pub const fn args(self) -> &'static [&'static str] {
        match self {
            Self::ThinDevices => &["list", "-tdev", "-gb", "-detail"],
            Self::FastAssociations => &["list", "-assoc"],
            Self::FastPolicies => &["list", "-fp", "-vp", "-v"],
            Self::StorageGroups => &["list", "-v"],
            Self::Pools => &["list", "-thin", "-pool", "-detail", "-gb"],
        }
    }

    /// File name of this feed inside a directory of saved XML output.
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::ThinDevices => "tdev.xml",
            Self::FastAssociations => "fast_assoc.xml",
            Self::FastPolicies => "fast_policy.xml",
            Self::StorageGroups => "sg.xml",
            Self::Pools => "pool.xml",
        }
    }
}

impl fmt::Display for Feed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ThinDevices => "thin device",
            Self::FastAssociations => "FAST association",
            Self::FastPolicies => "FAST policy",
            Self::StorageGroups => "storage group",
            Self::Pools => "pool",
        };

        f.write_str(name)
    }
}
