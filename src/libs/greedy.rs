use crate::libs::chs::Chs;
use crate::libs::gene::Gene;
use crate::libs::loc::Chromosome;
use std::collections::{HashMap, HashSet};

/// Greedy detector of CHS between two gene lists.
///
/// * `min_size` - minimum number of distinct families in a CHS
/// * `gap` - maximum distance (bp) between neighboring genes linked in a CHS
#[derive(Debug, Clone, Copy)]
pub struct GreedyAlg {
    min_size: usize,
    gap: i64,
}

type FamilyIndex<'a> = HashMap<&'a str, Vec<&'a Gene>>;

impl GreedyAlg {
    pub fn new(min_size: usize, gap: i64) -> Self {
        Self { min_size, gap }
    }

    /// Searches all CHS between two chromosomes.
    ///
    /// Both directions are searched, then redundant segments are merged.
    /// Gene lists should be rank-sorted and free of null-family genes.
    pub fn search(
        &self,
        chr_a: &Chromosome,
        chr_b: &Chromosome,
        list_a: &[Gene],
        list_b: &[Gene],
    ) -> Vec<Chs> {
        let mut found = vec![];
        self.search_one(chr_a, chr_b, list_a, list_b, &mut found);
        self.search_one(chr_b, chr_a, list_b, list_a, &mut found);

        log::trace!(
            "{}:{} vs {}:{}, {} candidates",
            chr_a.tax,
            chr_a.name,
            chr_b.tax,
            chr_b.name,
            found.len()
        );

        remove_redundancy(found, self.gap)
    }

    fn search_one(
        &self,
        chr_a: &Chromosome,
        chr_b: &Chromosome,
        list_a: &[Gene],
        list_b: &[Gene],
        found: &mut Vec<Chs>,
    ) {
        let mut fam_of: FamilyIndex = HashMap::new();
        for gene in list_b {
            fam_of.entry(gene.family.as_str()).or_default().push(gene);
        }

        for (idx, gene_a) in list_a.iter().enumerate() {
            let Some(partners) = fam_of.get(gene_a.family.as_str()) else {
                continue;
            };
            for gene_b in partners {
                if gene_a.id == gene_b.id {
                    continue;
                }
                let seed = Chs::new(chr_a, chr_b, gene_a.loc.clone(), gene_b.loc.clone());
                let families = HashSet::from([gene_a.family.as_str()]);
                if let Some(chs) = self.extend(idx, seed, families, chr_a, chr_b, list_a, &fam_of) {
                    found.push(chs);
                }
            }
        }
    }

    // Walks forward along list A until the next gene is too far away.
    #[allow(clippy::too_many_arguments)]
    fn extend<'a>(
        &self,
        mut idx: usize,
        mut chs: Chs,
        mut families: HashSet<&'a str>,
        chr_a: &Chromosome,
        chr_b: &Chromosome,
        list_a: &'a [Gene],
        fam_of: &FamilyIndex<'a>,
    ) -> Option<Chs> {
        loop {
            idx += 1;
            let next_a = match list_a.get(idx) {
                Some(gene) if chs.loc_a.mergeable_within(&gene.loc, self.gap) => gene,
                _ => break,
            };

            let Some(partners) = fam_of.get(next_a.family.as_str()) else {
                continue;
            };
            for next_b in partners {
                if next_a.id == next_b.id || !next_b.loc.mergeable_within(&chs.loc_b, self.gap) {
                    continue;
                }
                families.insert(next_a.family.as_str());

                let pair = Chs::new(chr_a, chr_b, next_a.loc.clone(), next_b.loc.clone());
                // both sides share chromosomes with the candidate
                if let Ok(merged) = chs.merge(&pair) {
                    chs = merged;
                }
            }
        }

        if families.len() >= self.min_size && !chs.overlaps_within(self.gap) {
            chs.sort_locs();
            Some(chs)
        } else {
            None
        }
    }
}

/// Merges redundant CHS.
///
/// The list is sorted, then each CHS is compared backwards with the kept
/// ones. The first mergeable one absorbs it, and the sweep restarts from the
/// enlarged CHS so it is checked against its own predecessors. No two CHS of
/// the result are mergeable within `gap`.
pub fn remove_redundancy(mut list: Vec<Chs>, gap: i64) -> Vec<Chs> {
    list.sort_by(|a, b| a.cmp_pos(b));

    let mut i = 1;
    while i < list.len() {
        let hit = (0..i)
            .rev()
            .find(|&j| list[j].mergeable_within(&list[i], gap));

        match hit {
            Some(j) => {
                let other = list.remove(i);
                if let Ok(merged) = list[j].merge(&other) {
                    list[j] = merged;
                }
                i = j.max(1);
            }
            None => i += 1,
        }
    }

    list
}
