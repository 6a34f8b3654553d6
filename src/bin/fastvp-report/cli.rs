use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::crate_version;
use clap::{Arg, ArgMatches, Command};

use fastvp::{Columns, Format, Options};

/// Where the feeds come from.
#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    Symcli {
        sid: String,
        symcli_dir: Option<PathBuf>,
    },

    /// Directory of saved XML output.
    Saved(PathBuf),
}

#[derive(Debug)]
pub struct Arguments {
    pub input: Input,
    pub options: Options,
    pub verbosity: u64,
}

impl TryFrom<ArgMatches> for Arguments {
    type Error = anyhow::Error;

    fn try_from(args: ArgMatches) -> Result<Self, Self::Error> {
        let input = if let Some(dir) = args.value_of("from-xml") {
            Input::Saved(dir.into())
        } else {
            let sid = args
                .value_of("sid")
                .with_context(|| "no sid argument")?
                .into();

            Input::Symcli {
                sid,
                symcli_dir: args.value_of("symcli-dir").map(PathBuf::from),
            }
        };

        let format = if args.is_present("quoted-csv") {
            Format::QuotedCsv
        } else if args.is_present("csv") {
            Format::Csv
        } else {
            Format::Aligned
        };

        let columns = Columns {
            storage_groups: args.is_present("show-all-sgs"),
            written: args.is_present("written"),
        };

        Ok(Self {
            input,
            options: Options { format, columns },
            verbosity: args.occurrences_of("verbose"),
        })
    }
}

pub fn args() -> Result<Arguments> {
    let arguments = build().get_matches();
    let arguments = Arguments::try_from(arguments)?;
    Ok(arguments)
}

pub fn build() -> Command<'static> {
    let sid = Arg::new("sid")
        .short('s')
        .long("sid")
        .takes_value(true)
        .value_name("SID")
        .required_unless_present("from-xml")
        .env("SYMCLI_SID")
        .help("Symmetrix serial number");

    let csv = Arg::new("csv")
        .long("csv")
        .conflicts_with("quoted-csv")
        .help("output CSV");

    let quoted_csv = Arg::new("quoted-csv")
        .long("quoted-csv")
        .alias("quotedcsv")
        .help("output CSV with every value quoted");

    let show_all_sgs = Arg::new("show-all-sgs")
        .long("show-all-sgs")
        .alias("showallsgs")
        .help("show all storage groups, not just FAST VP ones")
        .long_help(
            "Add a column listing every storage group a device belongs \
             to, not just the FAST VP managed one.",
        );

    let written = Arg::new("written")
        .long("written")
        .help("show written capacity");

    let symcli_dir = Arg::new("symcli-dir")
        .long("symcli-dir")
        .takes_value(true)
        .value_name("DIR")
        .env("SYMCLI_BIN_DIR")
        .help("SYMCLI binary directory")
        .long_help(
            "Directory searched for symcfg, symfast and symsg after PATH. \
             Defaults to /opt/emc/SYMCLI/bin.",
        );

    let from_xml = Arg::new("from-xml")
        .long("from-xml")
        .takes_value(true)
        .value_name("DIR")
        .help("read saved XML output instead of running SYMCLI")
        .long_help(
            "Read saved SYMCLI XML output from DIR instead of running \
             SYMCLI. Takes precedence over --sid and --symcli-dir, which \
             are not needed then. Expects tdev.xml, fast_assoc.xml, \
             fast_policy.xml, sg.xml and pool.xml.",
        );

    let verbose = Arg::new("verbose")
        .short('v')
        .long("verbose")
        .multiple_occurrences(true)
        .help("log more, repeat for debug output");

    Command::new("fastvp-report")
        .about("report FAST VP policy, capacity and binding per thin device")
        .version(crate_version!())
        .arg(sid)
        .arg(csv)
        .arg(quoted_csv)
        .arg(show_all_sgs)
        .arg(written)
        .arg(symcli_dir)
        .arg(from_xml)
        .arg(verbose)
        .mut_arg("help", |a| {
            a.short('?').help("print help").long_help("Print help.")
        })
        .mut_arg("version", |a| {
            a.hide_short_help(true).long_help("Print version.")
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Result<ArgMatches, clap::Error> {
        build().try_get_matches_from(
            std::iter::once("fastvp-report").chain(argv.iter().copied()),
        )
    }

    #[test]
    fn verify_command() {
        build().debug_assert();
    }

    #[test]
    fn csv_flags_conflict() {
        let err = parse(&["--sid", "000195700123", "--csv", "--quoted-csv"])
            .unwrap_err();

        assert_eq!(err.kind(), clap::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn legacy_flag_spellings() {
        let matches = parse(&[
            "--sid",
            "000195700123",
            "--quotedcsv",
            "--showallsgs",
            "-vv",
        ])
        .unwrap();

        let args = Arguments::try_from(matches).unwrap();

        assert!(matches!(
            args.input,
            Input::Symcli { sid, .. } if sid == "000195700123"
        ));
        assert_eq!(args.options.format, Format::QuotedCsv);
        assert!(args.options.columns.storage_groups);
        assert!(!args.options.columns.written);
        assert_eq!(args.verbosity, 2);
    }

    #[test]
    fn defaults() {
        let matches = parse(&["-s", "000195700123"]).unwrap();
        let args = Arguments::try_from(matches).unwrap();

        assert_eq!(args.options, Options::default());
        assert!(matches!(args.input, Input::Symcli { .. }));
        assert_eq!(args.verbosity, 0);
    }

    #[test]
    fn saved_xml_needs_no_sid() {
        let matches = parse(&["--from-xml", "/tmp/capture", "--csv"]).unwrap();
        let args = Arguments::try_from(matches).unwrap();

        assert_eq!(args.input, Input::Saved(PathBuf::from("/tmp/capture")));
        assert_eq!(args.options.format, Format::Csv);
    }
}
