use crate::libs::gene::Gene;
use crate::libs::loc::Chromosome;
use std::collections::{BTreeMap, HashMap};

pub const CLUSTER_SUFFIX: &str = "_cluster";

/// Preprocessed gene data shared by the search and the scoring stages.
///
/// * `ranked` - sorted, ranked genes per chromosome, tandem duplicates merged
///   when requested
/// * `filtered` - `ranked` without genes of the null family
/// * `gene_num` - species => number of ranked genes
/// * `fam_num` - species => family => number of filtered genes
/// * `mean_len` - mean gene length over all ranked genes
///
/// Keys of `ranked` and `filtered` carry the chromosome lengths.
#[derive(Debug, Clone, Default)]
pub struct Genome {
    ranked: BTreeMap<Chromosome, Vec<Gene>>,
    filtered: BTreeMap<Chromosome, Vec<Gene>>,
    gene_num: BTreeMap<String, usize>,
    fam_num: BTreeMap<String, HashMap<String, usize>>,
    mean_len: i64,
    merge_tandem: bool,
    null_family: String,
}

impl Genome {
    pub fn new(
        chr_map: BTreeMap<Chromosome, Vec<Gene>>,
        merge_tandem: bool,
        null_family: &str,
    ) -> Self {
        let mut genome = Genome {
            merge_tandem,
            null_family: null_family.to_string(),
            ..Default::default()
        };

        for (mut chr, mut genes) in chr_map {
            genome.set_ranks(&mut genes);

            let Some(last) = genes.last() else {
                log::warn!("No genes on {}, skipped", chr);
                continue;
            };
            chr.length = last.end();

            let kept: Vec<Gene> = genes
                .iter()
                .filter(|g| g.family != genome.null_family)
                .cloned()
                .collect();

            *genome.gene_num.entry(chr.tax.clone()).or_insert(0) += genes.len();

            let fam_of = genome.fam_num.entry(chr.tax.clone()).or_default();
            for gene in &kept {
                *fam_of.entry(gene.family.clone()).or_insert(0) += 1;
            }

            genome.filtered.insert(chr.clone(), kept);
            genome.ranked.insert(chr, genes);
        }

        genome.mean_len = genome.calc_mean_len();

        log::debug!(
            "Preprocessed {} chromosomes of {} species, mean gene length {}",
            genome.ranked.len(),
            genome.gene_num.len(),
            genome.mean_len
        );

        genome
    }

    fn set_ranks(&self, genes: &mut Vec<Gene>) {
        genes.sort_by(|a, b| a.loc.cmp(&b.loc));

        if !self.merge_tandem {
            for (i, gene) in genes.iter_mut().enumerate() {
                gene.rank = i + 1;
            }
            return;
        }

        let mut merged: Vec<Gene> = Vec::with_capacity(genes.len());
        for mut gene in genes.drain(..) {
            match merged.last_mut() {
                Some(last) if gene.family != self.null_family && gene.family == last.family => {
                    last.loc.end = last.loc.end.max(gene.end());
                    if !last.symbol.ends_with(CLUSTER_SUFFIX) {
                        last.symbol.push_str(CLUSTER_SUFFIX);
                    }
                }
                _ => {
                    gene.rank = merged.len() + 1;
                    merged.push(gene);
                }
            }
        }
        *genes = merged;
    }

    fn calc_mean_len(&self) -> i64 {
        let (total_len, total_num) = self
            .ranked
            .values()
            .flatten()
            .fold((0i64, 0i64), |(len, num), g| (len + g.len(), num + 1));

        if total_num == 0 {
            0
        } else {
            total_len / total_num
        }
    }

    pub fn ranked(&self) -> &BTreeMap<Chromosome, Vec<Gene>> {
        &self.ranked
    }

    pub fn filtered(&self) -> &BTreeMap<Chromosome, Vec<Gene>> {
        &self.filtered
    }

    pub fn ranked_of(&self, chr: &Chromosome) -> Option<&[Gene]> {
        self.ranked.get(chr).map(|v| v.as_slice())
    }

    pub fn filtered_of(&self, chr: &Chromosome) -> Option<&[Gene]> {
        self.filtered.get(chr).map(|v| v.as_slice())
    }

    /// Chromosomes in order, lengths included.
    pub fn chromosomes(&self) -> Vec<&Chromosome> {
        self.ranked.keys().collect()
    }

    pub fn gene_num(&self) -> &BTreeMap<String, usize> {
        &self.gene_num
    }

    pub fn gene_num_of(&self, tax: &str) -> usize {
        self.gene_num.get(tax).copied().unwrap_or(0)
    }

    pub fn fam_num_of(&self, tax: &str, family: &str) -> Option<usize> {
        self.fam_num.get(tax).and_then(|m| m.get(family)).copied()
    }

    /// Number of distinct non-null families of a species.
    pub fn families_of(&self, tax: &str) -> usize {
        self.fam_num.get(tax).map(|m| m.len()).unwrap_or(0)
    }

    pub fn mean_len(&self) -> i64 {
        self.mean_len
    }

    /// Converts a gap measured in genes into a genomic distance.
    pub fn gap_distance(&self, gap_num: usize) -> i64 {
        gap_num as i64 * self.mean_len
    }

    pub fn is_null(&self, family: &str) -> bool {
        family == self.null_family
    }
}
