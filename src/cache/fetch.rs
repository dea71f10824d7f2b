//! HTTP access to the Unicode Consortium's UCD distribution.

use std::{
    fs::{self, File},
    io::{self, BufRead, BufReader, Write},
    path::Path,
};

use log::info;

use crate::{
    cache::Config,
    ucd::{self, UcdFile},
    Error, Result,
};

/// Downloads UCD files from `Config::base_url`.
pub(crate) struct Fetcher {
    agent: ureq::Agent,
    base_url: String,
}

impl Fetcher {
    pub fn new(config: &Config) -> Self {
        Fetcher {
            agent: ureq::AgentBuilder::new()
                .timeout(config.download_timeout)
                .build(),
            base_url: config.base_url.clone(),
        }
    }

    fn url(&self, file: UcdFile) -> String {
        format!("{}{}", self.base_url, file.remote_path())
    }

    fn get(&self, url: &str) -> Result<ureq::Response> {
        self.agent.get(url).call().map_err(|e| Error::Download {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    /// Streams `file` into `dir`, through a `.part` file that is renamed once complete.
    ///
    /// # Errors
    /// Returns [`Error::Download`] for HTTP failures and [`Error::FileError`] for local I/O.
    pub fn download(&self, file: UcdFile, dir: &Path) -> Result<()> {
        let url = self.url(file);
        info!("Downloading {url}");

        let response = self.get(&url)?;
        let partial = dir.join(format!("{}.part", file.name()));
        let mut reader = response.into_reader();
        let mut out = File::create(&partial)?;
        io::copy(&mut reader, &mut out).map_err(|e| Error::Download {
            url: url.clone(),
            message: e.to_string(),
        })?;
        out.flush()?;
        out.sync_all()?;
        drop(out);

        fs::rename(&partial, dir.join(file.name()))?;
        Ok(())
    }

    /// Reads the Unicode version published upstream from the `DerivedAge.txt` header line.
    ///
    /// # Errors
    /// Returns [`Error::Download`] if the request fails.
    pub fn remote_version(&self) -> Result<Option<String>> {
        let url = self.url(UcdFile::DerivedAge);
        let response = self.get(&url)?;

        let mut header = String::new();
        BufReader::new(response.into_reader())
            .read_line(&mut header)
            .map_err(|e| Error::Download {
                url,
                message: e.to_string(),
            })?;

        Ok(ucd::unicode_version(&header))
    }
}
