use crate::evaluation::Snapshot;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufWriter, Error, Write};
use std::path::Path;
use strum_macros::{Display, EnumString};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum CurveFormat {
    #[default]
    Csv,
    Tsv,
    Json,
}

/// Ordered sequence of evaluation snapshots, exportable after a run.
#[derive(Default)]
pub struct LearningCurve {
    snapshots: Vec<Snapshot>,
}

impl LearningCurve {
    pub fn push(&mut self, snapshot: Snapshot) {
        self.snapshots.push(snapshot);
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn latest(&self) -> Option<&Snapshot> {
        self.snapshots.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Snapshot> {
        self.snapshots.iter()
    }

    pub fn export(&self, path: &Path, format: CurveFormat) -> Result<(), Error> {
        let mut out = BufWriter::new(File::create(path)?);
        match format {
            CurveFormat::Csv => self.write_delimited(&mut out, ','),
            CurveFormat::Tsv => self.write_delimited(&mut out, '\t'),
            CurveFormat::Json => {
                serde_json::to_writer_pretty(&mut out, &self.snapshots).map_err(Error::from)?;
                writeln!(out)
            }
        }
    }

    fn write_delimited(&self, out: &mut impl Write, sep: char) -> Result<(), Error> {
        let extra_keys: BTreeSet<&str> = self
            .snapshots
            .iter()
            .flat_map(|s| s.extras.keys().map(String::as_str))
            .collect();

        write!(out, "instances_seen{sep}accuracy{sep}kappa{sep}ram_hours{sep}seconds")?;
        for key in &extra_keys {
            write!(out, "{sep}{key}")?;
        }
        writeln!(out)?;

        for s in &self.snapshots {
            write!(
                out,
                "{}{sep}{}{sep}{}{sep}{}{sep}{}",
                s.instances_seen, s.accuracy, s.kappa, s.ram_hours, s.seconds
            )?;
            for key in &extra_keys {
                match s.extras.get(*key) {
                    Some(v) => write!(out, "{sep}{v}")?,
                    None => write!(out, "{sep}")?,
                }
            }
            writeln!(out)?;
        }
        Ok(())
    }
}
