use crate::libs::error::ChsError;
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

//----------------------------
// Chromosome
//----------------------------
/// A chromosome of one species.
///
/// Identity, ordering and hashing only look at `tax` and `name`; `length` is
/// filled in by preprocessing once all genes are known.
#[derive(Debug, Clone, Default)]
pub struct Chromosome {
    pub tax: String,
    pub name: String,
    pub length: i64,
}

impl Chromosome {
    /// ```
    /// # use chsm::libs::loc::Chromosome;
    /// let chr = Chromosome::new("Hs", "1");
    /// assert_eq!(chr.tax, "Hs");
    /// assert_eq!(chr.length, 0);
    /// assert_eq!(chr.to_string(), "Hs\t1");
    /// ```
    pub fn new(tax: &str, name: &str) -> Self {
        Self {
            tax: tax.to_string(),
            name: name.to_string(),
            length: 0,
        }
    }

    pub fn same_tax(&self, other: &Chromosome) -> bool {
        self.tax == other.tax
    }

    /// Matches `tax` alone or `tax:name`.
    ///
    /// ```
    /// # use chsm::libs::loc::Chromosome;
    /// let chr = Chromosome::new("Hs", "1");
    /// assert!(chr.matches("Hs"));
    /// assert!(chr.matches("Hs:1"));
    /// assert!(!chr.matches("Hs:2"));
    /// assert!(!chr.matches("Mm"));
    /// ```
    pub fn matches(&self, pattern: &str) -> bool {
        match pattern.split_once(':') {
            Some((tax, name)) => self.tax == tax && self.name == name,
            None => self.tax == pattern,
        }
    }
}

impl FromStr for Chromosome {
    type Err = anyhow::Error;

    /// ```
    /// # use chsm::libs::loc::Chromosome;
    /// let chr: Chromosome = "Mm:7".parse().unwrap();
    /// assert_eq!(chr, Chromosome::new("Mm", "7"));
    /// assert!("Mm".parse::<Chromosome>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((tax, name)) if !tax.is_empty() && !name.is_empty() => {
                Ok(Chromosome::new(tax, name))
            }
            _ => Err(anyhow::anyhow!("Expect a chromosome as TAX:NAME, got \"{}\"", s)),
        }
    }
}

impl PartialEq for Chromosome {
    fn eq(&self, other: &Self) -> bool {
        self.tax == other.tax && self.name == other.name
    }
}

impl Eq for Chromosome {}

impl Hash for Chromosome {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tax.hash(state);
        self.name.hash(state);
    }
}

impl PartialOrd for Chromosome {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Chromosome {
    fn cmp(&self, other: &Self) -> Ordering {
        self.tax
            .cmp(&other.tax)
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl std::fmt::Display for Chromosome {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}\t{}", self.tax, self.name)
    }
}

//----------------------------
// Loc
//----------------------------
/// A closed range `[start, end]` on a chromosome.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Loc {
    pub chr: Chromosome,
    pub start: i64,
    pub end: i64,
}

impl Loc {
    /// `start > end` is accepted; distances computed from such a range may be
    /// meaningless.
    pub fn new(chr: &Chromosome, start: i64, end: i64) -> Self {
        if start > end {
            log::warn!(
                "'start > end' in {}:{}-{}, this may cause calculation errors",
                chr.name,
                start,
                end
            );
        }
        Self {
            chr: Chromosome::new(&chr.tax, &chr.name),
            start,
            end,
        }
    }

    /// ```
    /// # use chsm::libs::loc::{Chromosome, Loc};
    /// let loc = Loc::new(&Chromosome::new("Hs", "1"), 100, 199);
    /// assert_eq!(loc.len(), 100);
    /// ```
    pub fn len(&self) -> i64 {
        self.end - self.start + 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 0
    }

    /// Gap between the nearest edges; `Some(0)` when overlapping, `None` when
    /// the two ranges sit on different chromosomes.
    ///
    /// ```
    /// # use chsm::libs::loc::{Chromosome, Loc};
    /// let chr = Chromosome::new("Hs", "1");
    /// let a = Loc::new(&chr, 100, 199);
    /// let b = Loc::new(&chr, 300, 399);
    /// assert_eq!(a.dist(&b), Some(101));
    /// assert_eq!(b.dist(&a), Some(101));
    /// assert_eq!(a.dist(&Loc::new(&chr, 150, 350)), Some(0));
    ///
    /// let c = Loc::new(&Chromosome::new("Hs", "2"), 100, 199);
    /// assert_eq!(a.dist(&c), None);
    /// ```
    pub fn dist(&self, other: &Loc) -> Option<i64> {
        if self.chr != other.chr {
            None
        } else if self.end < other.start {
            Some(other.start - self.end)
        } else if self.start > other.end {
            Some(self.start - other.end)
        } else {
            Some(0)
        }
    }

    pub fn mergeable(&self, other: &Loc) -> bool {
        self.chr == other.chr
    }

    pub fn mergeable_within(&self, other: &Loc, dist: i64) -> bool {
        match self.dist(other) {
            Some(d) => d <= dist,
            None => false,
        }
    }

    /// ```
    /// # use chsm::libs::loc::{Chromosome, Loc};
    /// let chr = Chromosome::new("Hs", "1");
    /// let a = Loc::new(&chr, 100, 199);
    /// let b = Loc::new(&chr, 300, 399);
    /// let m = a.merge(&b).unwrap();
    /// assert_eq!((m.start, m.end), (100, 399));
    ///
    /// let c = Loc::new(&Chromosome::new("Mm", "1"), 100, 199);
    /// assert!(a.merge(&c).is_err());
    /// ```
    pub fn merge(&self, other: &Loc) -> Result<Loc, ChsError> {
        if !self.mergeable(other) {
            return Err(ChsError::NotMergeable(format!("{} and {}", self, other)));
        }
        Ok(Loc {
            chr: self.chr.clone(),
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        })
    }
}

impl std::fmt::Display for Loc {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}\t{}\t{}", self.chr, self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chromosome_identity() {
        let mut a = Chromosome::new("Hs", "1");
        a.length = 5000;
        let b = Chromosome::new("Hs", "1");
        assert_eq!(a, b);
        assert!(Chromosome::new("Hs", "2") > a);
        assert!(Chromosome::new("Mm", "1") > Chromosome::new("Hs", "X"));

        let mut set = std::collections::HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn test_dist_symmetric() {
        let chr = Chromosome::new("Hs", "1");
        let pairs = [(1, 10, 11, 20), (1, 10, 50, 60), (5, 5, 6, 6), (100, 200, 1000, 1100)];
        for (s1, e1, s2, e2) in pairs {
            let i = Loc::new(&chr, s1, e1);
            let j = Loc::new(&chr, s2, e2);
            assert_eq!(i.dist(&j), Some(s2 - e1));
            assert_eq!(i.dist(&j), j.dist(&i));
        }
    }

    #[test]
    fn test_different_chromosomes() {
        let a = Loc::new(&Chromosome::new("Hs", "1"), 1, 10);
        let b = Loc::new(&Chromosome::new("Hs", "2"), 1, 10);
        assert_eq!(a.dist(&b), None);
        for d in [0, 10, i64::MAX] {
            assert!(!a.mergeable_within(&b, d));
        }
        assert!(!a.mergeable(&b));
    }

    #[test]
    fn test_mergeable_within() {
        let chr = Chromosome::new("Hs", "1");
        let a = Loc::new(&chr, 1, 10);
        let b = Loc::new(&chr, 20, 30);
        assert!(a.mergeable_within(&b, 10));
        assert!(!a.mergeable_within(&b, 9));
    }

    #[test]
    fn test_ordering() {
        let chr1 = Chromosome::new("Hs", "1");
        let chr2 = Chromosome::new("Hs", "2");
        let mut locs = vec![
            Loc::new(&chr2, 1, 10),
            Loc::new(&chr1, 50, 60),
            Loc::new(&chr1, 5, 8),
        ];
        locs.sort();
        assert_eq!(locs[0].start, 5);
        assert_eq!(locs[1].start, 50);
        assert_eq!(locs[2].chr, chr2);
    }

    #[test]
    fn test_degenerate() {
        let loc = Loc::new(&Chromosome::new("Hs", "1"), 20, 10);
        assert_eq!(loc.len(), -9);
        assert!(loc.is_empty());
    }
}
