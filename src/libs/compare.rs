//! Checks CHS against homolog gene pairs.
//!
//! Every pair of same-family genes from two species is turned into a
//! single-gene CHS, then classified as linked or unlinked by a CHS set. With
//! a reference set and a predicted set this gives a confusion table.

use crate::libs::chs::Chs;
use crate::libs::gene::Gene;
use crate::libs::loc::Chromosome;
use std::collections::BTreeMap;

/// Same-family gene pairs between `tax_a` and `tax_b`, as canonical CHS.
pub fn homolog_pairs(
    chr_map: &BTreeMap<Chromosome, Vec<Gene>>,
    tax_a: &str,
    tax_b: &str,
    null_family: &str,
) -> Vec<Chs> {
    let mut fam_of: BTreeMap<&str, Vec<&Gene>> = BTreeMap::new();
    for gene in chr_map.values().flatten() {
        if gene.family == null_family {
            continue;
        }
        fam_of.entry(gene.family.as_str()).or_default().push(gene);
    }

    let mut pairs = vec![];
    for genes in fam_of.values() {
        if genes.len() < 2 {
            continue;
        }
        let org_a = genes.iter().filter(|g| g.chr().tax == tax_a);
        for gene_a in org_a {
            for gene_b in genes.iter().filter(|g| g.chr().tax == tax_b) {
                let mut chs = Chs::new(
                    gene_a.chr(),
                    gene_b.chr(),
                    gene_a.loc.clone(),
                    gene_b.loc.clone(),
                );
                chs.sort_locs();
                pairs.push(chs);
            }
        }
    }

    pairs
}

/// Splits `pairs` into the ones linked by some CHS of `chs_list` and the rest.
pub fn link(chs_list: &[Chs], pairs: &[Chs]) -> (Vec<Chs>, Vec<Chs>) {
    let canonical: Vec<Chs> = chs_list
        .iter()
        .map(|c| {
            let mut c = c.clone();
            c.sort_locs();
            c
        })
        .collect();

    pairs
        .iter()
        .cloned()
        .partition(|pair| canonical.iter().any(|c| pair.links(c)))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Confusion {
    pub pairs: usize,
    pub positive: usize,
    pub negative: usize,
    pub tp: usize,
    pub fn_: usize,
    pub fp: usize,
    pub tn: usize,
}

impl Confusion {
    /// `reference` decides the positive set, `predicted` is scored against it.
    pub fn new(reference: &[Chs], predicted: &[Chs], pairs: &[Chs]) -> Self {
        let (p_set, n_set) = link(reference, pairs);
        let (tp_set, fn_set) = link(predicted, &p_set);
        let (fp_set, tn_set) = link(predicted, &n_set);

        Self {
            pairs: pairs.len(),
            positive: p_set.len(),
            negative: n_set.len(),
            tp: tp_set.len(),
            fn_: fn_set.len(),
            fp: fp_set.len(),
            tn: tn_set.len(),
        }
    }

    pub fn sensitivity(&self) -> f64 {
        ratio(self.tp, self.tp + self.fn_)
    }

    pub fn specificity(&self) -> f64 {
        ratio(self.tn, self.tn + self.fp)
    }
}

fn ratio(a: usize, b: usize) -> f64 {
    if b == 0 {
        0.0
    } else {
        a as f64 / b as f64
    }
}

impl std::fmt::Display for Confusion {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f, "{}\t{}\t{}", self.pairs, self.positive, self.negative)?;
        writeln!(f, "{}\t{}\t{}", self.positive, self.tp, self.fn_)?;
        writeln!(f, "{}\t{}\t{}", self.negative, self.fp, self.tn)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::loc::Loc;

    fn chr_map() -> BTreeMap<Chromosome, Vec<Gene>> {
        let hs = Chromosome::new("Hs", "1");
        let mm = Chromosome::new("Mm", "1");
        let rn = Chromosome::new("Rn", "1");
        let mut map = BTreeMap::new();
        map.insert(
            hs.clone(),
            vec![
                Gene::new("h1", "A", "h1", &hs, "+", 100, 199),
                Gene::new("h2", "B", "h2", &hs, "+", 300, 399),
                Gene::new("h3", "C", "h3", &hs, "+", 5000, 5099),
                Gene::new("h4", "0", "h4", &hs, "+", 6000, 6099),
            ],
        );
        map.insert(
            mm.clone(),
            vec![
                Gene::new("m1", "A", "m1", &mm, "+", 100, 199),
                Gene::new("m2", "B", "m2", &mm, "+", 300, 399),
                Gene::new("m3", "C", "m3", &mm, "+", 9000, 9099),
                Gene::new("m4", "0", "m4", &mm, "+", 9500, 9599),
            ],
        );
        map.insert(rn.clone(), vec![Gene::new("r1", "A", "r1", &rn, "+", 1, 99)]);
        map
    }

    fn chs(a: (i64, i64), b: (i64, i64)) -> Chs {
        let hs = Chromosome::new("Hs", "1");
        let mm = Chromosome::new("Mm", "1");
        Chs::new(&hs, &mm, Loc::new(&hs, a.0, a.1), Loc::new(&mm, b.0, b.1))
    }

    #[test]
    fn test_homolog_pairs() {
        let pairs = homolog_pairs(&chr_map(), "Mm", "Hs", "0");
        assert_eq!(pairs.len(), 3);
        assert!(pairs.iter().all(|p| p.chr_a.tax == "Hs"));
    }

    #[test]
    fn test_confusion() {
        let pairs = homolog_pairs(&chr_map(), "Hs", "Mm", "0");
        let reference = vec![chs((100, 399), (100, 399)), chs((5000, 5099), (9000, 9099))];
        let predicted = vec![chs((100, 199), (100, 199))];

        let confusion = Confusion::new(&reference, &predicted, &pairs);
        assert_eq!(confusion.positive, 3);
        assert_eq!(confusion.negative, 0);
        assert_eq!(confusion.tp, 1);
        assert_eq!(confusion.fn_, 2);
        assert!((confusion.sensitivity() - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(confusion.to_string(), "3\t3\t0\n3\t1\t2\n0\t0\t0\n");
    }

    #[test]
    fn test_link_swapped_sides() {
        let pairs = homolog_pairs(&chr_map(), "Hs", "Mm", "0");
        let swapped: Vec<Chs> = vec![chs((100, 399), (100, 399))]
            .into_iter()
            .map(|c| Chs::new(&c.chr_b, &c.chr_a, c.loc_b, c.loc_a))
            .collect();

        let (linked, unlinked) = link(&swapped, &pairs);
        assert_eq!(linked.len(), 2);
        assert_eq!(unlinked.len(), 1);
    }
}
