use crate::libs::error::ChsError;
use crate::libs::loc::{Chromosome, Loc};
use std::cmp::Ordering;
use std::io::BufRead;
use std::str::FromStr;

pub const CHS_HEADER: &str = "#Species A\tChromosome A\tStart A\tEnd A\t\
Species B\tChromosome B\tStart B\tEnd B\tSize\tP value";

pub const PAIR_HEADER: &str = "#GeneID A\tSymbol A\tGeneID B\tSymbol B";

/// A chromosomal homology segment: a pair of ranges linking two chromosomes.
///
/// `size` and `p_value` are assigned by [`crate::libs::stat::Scorer`].
#[derive(Debug, Clone, PartialEq)]
pub struct Chs {
    pub chr_a: Chromosome,
    pub chr_b: Chromosome,
    pub loc_a: Loc,
    pub loc_b: Loc,
    pub size: usize,
    pub p_value: f64,
}

impl Chs {
    pub fn new(chr_a: &Chromosome, chr_b: &Chromosome, loc_a: Loc, loc_b: Loc) -> Self {
        Self {
            chr_a: chr_a.clone(),
            chr_b: chr_b.clone(),
            loc_a,
            loc_b,
            size: 0,
            p_value: 0.0,
        }
    }

    /// Both sides point to the same region within `dist`.
    pub fn overlaps_within(&self, dist: i64) -> bool {
        self.loc_a.mergeable_within(&self.loc_b, dist)
    }

    /// Puts the smaller range on side A.
    ///
    /// ```
    /// # use chsm::libs::loc::{Chromosome, Loc};
    /// # use chsm::libs::chs::Chs;
    /// let hs = Chromosome::new("Hs", "1");
    /// let mm = Chromosome::new("Mm", "1");
    /// let mut chs = Chs::new(&mm, &hs, Loc::new(&mm, 1, 10), Loc::new(&hs, 1, 10));
    /// chs.sort_locs();
    /// assert_eq!(chs.chr_a, hs);
    /// assert_eq!(chs.loc_b.chr, mm);
    /// ```
    pub fn sort_locs(&mut self) {
        if self.loc_a > self.loc_b {
            std::mem::swap(&mut self.chr_a, &mut self.chr_b);
            std::mem::swap(&mut self.loc_a, &mut self.loc_b);
        }
    }

    /// Ordering by chromosome A, chromosome B, then start of range A.
    pub fn cmp_pos(&self, other: &Chs) -> Ordering {
        self.chr_a
            .cmp(&other.chr_a)
            .then_with(|| self.chr_b.cmp(&other.chr_b))
            .then_with(|| self.loc_a.start.cmp(&other.loc_a.start))
    }

    pub fn mergeable(&self, other: &Chs) -> bool {
        self.loc_a.mergeable(&other.loc_a) && self.loc_b.mergeable(&other.loc_b)
    }

    pub fn mergeable_within(&self, other: &Chs, dist: i64) -> bool {
        self.loc_a.mergeable_within(&other.loc_a, dist)
            && self.loc_b.mergeable_within(&other.loc_b, dist)
    }

    /// Unions both sides; the chromosomes of `self` are kept.
    pub fn merge(&self, other: &Chs) -> Result<Chs, ChsError> {
        if !self.mergeable(other) {
            return Err(ChsError::NotMergeable(format!(
                "CHS {}:{} and {}:{}",
                self.chr_a.name, self.chr_b.name, other.chr_a.name, other.chr_b.name
            )));
        }
        Ok(Chs::new(
            &self.chr_a,
            &self.chr_b,
            self.loc_a.merge(&other.loc_a)?,
            self.loc_b.merge(&other.loc_b)?,
        ))
    }

    /// Both ranges of `other` touch the ranges of this segment.
    pub fn links(&self, other: &Chs) -> bool {
        self.mergeable_within(other, 0)
    }
}

impl std::fmt::Display for Chs {
    /// ```
    /// # use chsm::libs::loc::{Chromosome, Loc};
    /// # use chsm::libs::chs::Chs;
    /// let hs = Chromosome::new("Hs", "1");
    /// let mm = Chromosome::new("Mm", "7");
    /// let mut chs = Chs::new(&hs, &mm, Loc::new(&hs, 1000, 5999), Loc::new(&mm, 2000, 6999));
    /// chs.size = 3;
    /// chs.p_value = 0.000012341;
    /// assert_eq!(chs.to_string(), "Hs\t1\t1000\t5999\tMm\t7\t2000\t6999\t3\t1.234E-5");
    /// ```
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{:.3E}",
            self.loc_a, self.loc_b, self.size, self.p_value
        )
    }
}

impl FromStr for Chs {
    type Err = anyhow::Error;

    /// Size and p-value columns are optional.
    ///
    /// ```
    /// # use chsm::libs::chs::Chs;
    /// let chs: Chs = "Hs\t1\t1000\t5999\tMm\t7\t2000\t6999".parse().unwrap();
    /// assert_eq!(chs.chr_b.tax, "Mm");
    /// assert_eq!(chs.size, 0);
    ///
    /// let chs: Chs = "Hs\t1\t1000\t5999\tMm\t7\t2000\t6999\t3\t1.234E-5".parse().unwrap();
    /// assert_eq!(chs.size, 3);
    /// assert!((chs.p_value - 1.234e-5).abs() < 1e-12);
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.trim_end_matches(['\r', '\n']).split('\t').collect();
        if fields.len() < 8 {
            return Err(anyhow::anyhow!(
                "Data is not complete: {} of 8 fields",
                fields.len()
            ));
        }

        let num = |s: &str| -> anyhow::Result<i64> {
            s.trim()
                .parse::<i64>()
                .map_err(|_| anyhow::anyhow!("Value is not a valid number: \"{}\"", s))
        };

        let chr_a = Chromosome::new(fields[0], fields[1]);
        let chr_b = Chromosome::new(fields[4], fields[5]);
        let loc_a = Loc::new(&chr_a, num(fields[2])?, num(fields[3])?);
        let loc_b = Loc::new(&chr_b, num(fields[6])?, num(fields[7])?);

        let mut chs = Chs::new(&chr_a, &chr_b, loc_a, loc_b);
        if fields.len() >= 9 {
            chs.size = fields[8]
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("Value is not a valid number: \"{}\"", fields[8]))?;
        }
        if fields.len() >= 10 {
            chs.p_value = fields[9]
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("Value is not a valid number: \"{}\"", fields[9]))?;
        }

        Ok(chs)
    }
}

/// Reads a CHS file. Header and comment lines start with `#` or `>`.
pub fn read_chs<R: BufRead>(reader: R) -> anyhow::Result<Vec<Chs>> {
    let mut chs_list = vec![];

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.starts_with('#') || line.trim().is_empty() {
            continue;
        }
        // header of the plain table output
        if line.starts_with('>') && line.contains("Species A") {
            continue;
        }
        // with gene pairs: segment lines carry a `>` and pair lines a leading space
        if line.starts_with(' ') {
            continue;
        }
        let line = line.trim_start_matches('>');

        let chs: Chs = line
            .parse()
            .map_err(|e: anyhow::Error| ChsError::format(i + 1, e.to_string()))?;
        chs_list.push(chs);
    }

    Ok(chs_list)
}
