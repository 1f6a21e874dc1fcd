use crate::libs::error::ChsError;
use crate::libs::loc::{Chromosome, Loc};
use std::collections::BTreeMap;
use std::io::BufRead;
use std::str::FromStr;

/// A gene: a located range plus family, identity and orientation.
///
/// `rank` stays 0 until preprocessing assigns it.
#[derive(Debug, Clone, PartialEq)]
pub struct Gene {
    pub loc: Loc,
    pub id: String,
    pub family: String,
    pub rank: usize,
    pub orient: String,
    pub symbol: String,
}

impl Gene {
    pub fn new(
        id: &str,
        family: &str,
        symbol: &str,
        chr: &Chromosome,
        orient: &str,
        start: i64,
        end: i64,
    ) -> Self {
        Self {
            loc: Loc::new(chr, start, end),
            id: id.to_string(),
            family: family.to_string(),
            rank: 0,
            orient: orient.to_string(),
            symbol: symbol.to_string(),
        }
    }

    pub fn chr(&self) -> &Chromosome {
        &self.loc.chr
    }

    pub fn start(&self) -> i64 {
        self.loc.start
    }

    pub fn end(&self) -> i64 {
        self.loc.end
    }

    pub fn len(&self) -> i64 {
        self.loc.len()
    }
}

impl FromStr for Gene {
    type Err = anyhow::Error;

    /// ```
    /// # use chsm::libs::gene::Gene;
    /// let gene: Gene = "g1\tF1\tGA1\tHs\t1\t+\t1000\t1999".parse().unwrap();
    /// assert_eq!(gene.family, "F1");
    /// assert_eq!(gene.chr().name, "1");
    /// assert_eq!(gene.len(), 1000);
    /// assert_eq!(gene.to_string(), "g1\tF1\tGA1\tHs\t1\t+\t1000\t1999\t0");
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.trim_end_matches(['\r', '\n']).split('\t').collect();
        if fields.len() < 8 {
            return Err(anyhow::anyhow!(
                "Data is not complete: {} of 8 fields",
                fields.len()
            ));
        }

        let start: i64 = fields[6]
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("Value is not a valid number: \"{}\"", fields[6]))?;
        let end: i64 = fields[7]
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("Value is not a valid number: \"{}\"", fields[7]))?;

        let chr = Chromosome::new(fields[3], fields[4]);
        Ok(Gene::new(
            fields[0], fields[1], fields[2], &chr, fields[5], start, end,
        ))
    }
}

impl std::fmt::Display for Gene {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.id,
            self.family,
            self.symbol,
            self.loc.chr.tax,
            self.loc.chr.name,
            self.orient,
            self.loc.start,
            self.loc.end,
            self.rank
        )
    }
}

/// Reads a gene file into per-chromosome gene lists.
///
/// Lines starting with `#` are skipped. A line that cannot be parsed fails
/// with its line number. Records with an empty identifier field or a zero
/// coordinate are dropped.
pub fn read_genes<R: BufRead>(reader: R) -> anyhow::Result<BTreeMap<Chromosome, Vec<Gene>>> {
    let mut chr_map: BTreeMap<Chromosome, Vec<Gene>> = BTreeMap::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.starts_with('#') || line.trim().is_empty() {
            continue;
        }

        let gene: Gene = line
            .parse()
            .map_err(|e: anyhow::Error| ChsError::format(i + 1, e.to_string()))?;

        if gene.id.is_empty()
            || gene.family.is_empty()
            || gene.loc.chr.tax.is_empty()
            || gene.loc.chr.name.is_empty()
            || gene.orient.is_empty()
            || gene.start() == 0
            || gene.end() == 0
        {
            log::debug!("Skip incomplete record at line {}", i + 1);
            continue;
        }

        chr_map.entry(gene.chr().clone()).or_default().push(gene);
    }

    Ok(chr_map)
}
