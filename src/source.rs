use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{anyhow, Context, Result};
use tracing::{debug, info};

use crate::feed::Feed;

/// Default install location of the Solutions Enabler binaries.
pub const DEFAULT_SYMCLI_DIR: &str = "/opt/emc/SYMCLI/bin";

/// Something that answers a [`Feed`] with an XML document.
pub trait Source {
    /// Returns the raw XML document for `feed`.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be obtained.
    fn query(&self, feed: Feed) -> Result<String>;
}

/// Runs the SYMCLI binaries against one array.
#[derive(Debug)]
pub struct Symcli {
    sid: String,
    search_path: OsString,
}

impl Symcli {
    /// Creates a source for array `sid`.
    ///
    /// Binaries are searched for in `PATH` first, then in `symcli_dir`, or
    /// [`DEFAULT_SYMCLI_DIR`] when none is given.
    ///
    /// # Errors
    ///
    /// Returns an error if the search path cannot be assembled.
    pub fn new(sid: &str, symcli_dir: Option<&Path>) -> Result<Self> {
        let symcli_dir = symcli_dir
            .map_or_else(|| PathBuf::from(DEFAULT_SYMCLI_DIR), Path::to_path_buf);

        let mut dirs = env::var_os("PATH")
            .map(|path| env::split_paths(&path).collect::<Vec<_>>())
            .unwrap_or_default();
        dirs.push(symcli_dir);

        let search_path = env::join_paths(dirs)
            .with_context(|| "assembling SYMCLI search path")?;

        Ok(Self {
            sid: sid.into(),
            search_path,
        })
    }

    fn command(&self, feed: Feed) -> Result<Command> {
        let cwd = env::current_dir()
            .with_context(|| "reading current directory")?;

        let program =
            which::which_in(feed.program(), Some(&self.search_path), cwd)
                .with_context(|| {
                    format!("locating SYMCLI binary {}", feed.program())
                })?;

        let mut cmd = Command::new(program);
        cmd.arg("-sid")
            .arg(&self.sid)
            .args(feed.args())
            .args(["-output", "xml_e"]);

        Ok(cmd)
    }
}

impl Source for Symcli {
    fn query(&self, feed: Feed) -> Result<String> {
        let mut cmd = self.command(feed)?;

        info!(%feed, sid = %self.sid, "querying");

        let output = cmd
            .output()
            .with_context(|| format!("error running: {:?}", cmd))?;

        if output.status.success() {
            let output = String::from_utf8(output.stdout).with_context(|| {
                format!("parsing {:?} command output to UTF8", cmd)
            })?;

            debug!(%feed, bytes = output.len(), "query finished");

            Ok(output)
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);

            Err(anyhow!(
                "error running: {:?} ({}): {}",
                cmd,
                output.status,
                stderr.trim()
            ))
        }
    }
}

/// Reads previously captured XML output from a directory.
///
/// Each feed is expected in the file named by [`Feed::file_name`].
#[derive(Debug)]
pub struct XmlDir {
    dir: PathBuf,
}

impl XmlDir {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl Source for XmlDir {
    fn query(&self, feed: Feed) -> Result<String> {
        let path = self.dir.join(feed.file_name());

        info!(%feed, path = %path.display(), "reading");

        fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))
    }
}
