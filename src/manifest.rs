//! Manifest parsing.
//!
//! The merge tool reads its input from a plain-text manifest, one repository
//! per line: `<remote-url> <name> [local-folder]`, whitespace-separated. The
//! local folder defaults to the name. A malformed line aborts the whole run.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use crate::error::{Error, Result};

/// One repository to clone and rewrite, parsed from a manifest line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkSpec {
    /// Remote URL to clone from.
    pub remote_url: String,
    /// Repository name, used as the remote name in the destination.
    pub name: String,
    /// Local folder to clone into; also the path prefix for the rewrite.
    pub local_folder: String,
}

impl WorkSpec {
    /// Parse a single manifest line. Blank lines yield `None`.
    pub fn parse(line: &str, lineno: usize) -> Result<Option<Self>> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        match fields.as_slice() {
            [] => Ok(None),
            [url, name, rest @ ..] => Ok(Some(Self {
                remote_url: url.to_string(),
                name: name.to_string(),
                local_folder: rest.first().unwrap_or(name).to_string(),
            })),
            _ => Err(Error::Manifest {
                lineno,
                line: line.to_string(),
            }),
        }
    }
}

/// Iterator over the work specs in a manifest file.
///
/// Lines are read lazily so large manifests feed the pipeline with
/// backpressure rather than being slurped up front.
pub struct WorkSpecs<R: BufRead> {
    lines: Lines<R>,
    lineno: usize,
}

impl WorkSpecs<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::from_reader(BufReader::new(file)))
    }
}

impl<R: BufRead> WorkSpecs<R> {
    pub fn from_reader(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            lineno: 0,
        }
    }
}

impl<R: BufRead> Iterator for WorkSpecs<R> {
    type Item = Result<WorkSpec>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.lineno += 1;
            match self.lines.next()? {
                Err(e) => return Some(Err(e.into())),
                Ok(line) => match WorkSpec::parse(&line, self.lineno) {
                    Err(e) => return Some(Err(e)),
                    Ok(None) => continue, // blank line
                    Ok(Some(spec)) => return Some(Ok(spec)),
                },
            }
        }
    }
}
