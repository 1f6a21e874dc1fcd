use crate::libs::chs::{Chs, CHS_HEADER, PAIR_HEADER};
use crate::libs::error::ChsError;
use crate::libs::gene::Gene;
use crate::libs::loc::{Chromosome, Loc};
use crate::libs::prep::Genome;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io::Write;

/// Genes covered by a CHS.
///
/// `matched_a[i]` and `matched_b[i]` are genes of the same family.
#[derive(Debug, Clone, Default)]
pub struct ChsGenes {
    pub genes_a: Vec<Gene>,
    pub genes_b: Vec<Gene>,
    pub matched_a: Vec<Gene>,
    pub matched_b: Vec<Gene>,
}

impl ChsGenes {
    /// Distinct families among the matched pairs.
    pub fn families(&self) -> BTreeSet<&str> {
        self.matched_a.iter().map(|g| g.family.as_str()).collect()
    }
}

/// Chromosome => chromosome => positions in [`ScoredResult::chs_list`].
///
/// Every CHS is registered in both directions.
#[derive(Debug, Clone, Default)]
pub struct ChsIndex {
    map: BTreeMap<Chromosome, BTreeMap<Chromosome, BTreeSet<usize>>>,
}

impl ChsIndex {
    pub fn build(chs_list: &[Chs]) -> Self {
        let mut map: BTreeMap<Chromosome, BTreeMap<Chromosome, BTreeSet<usize>>> =
            BTreeMap::new();
        for (i, chs) in chs_list.iter().enumerate() {
            map.entry(chs.chr_a.clone())
                .or_default()
                .entry(chs.chr_b.clone())
                .or_default()
                .insert(i);
            map.entry(chs.chr_b.clone())
                .or_default()
                .entry(chs.chr_a.clone())
                .or_default()
                .insert(i);
        }
        Self { map }
    }

    /// Partner chromosomes of `chr`.
    pub fn partners(&self, chr: &Chromosome) -> Vec<&Chromosome> {
        self.map
            .get(chr)
            .map(|m| m.keys().collect())
            .unwrap_or_default()
    }

    pub fn between(&self, chr_a: &Chromosome, chr_b: &Chromosome) -> Vec<usize> {
        self.map
            .get(chr_a)
            .and_then(|m| m.get(chr_b))
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default()
    }
}

/// Scored CHS with their lookup index.
#[derive(Debug, Clone, Default)]
pub struct ScoredResult {
    pub chs_list: Vec<Chs>,
    pub index: ChsIndex,
}

impl ScoredResult {
    pub fn between(&self, chr_a: &Chromosome, chr_b: &Chromosome) -> Vec<&Chs> {
        self.index
            .between(chr_a, chr_b)
            .into_iter()
            .map(|i| &self.chs_list[i])
            .collect()
    }

    /// CHS with at least `min_size` families and a p-value of at most
    /// `max_p`.
    ///
    /// With `chr`, only CHS touching it are returned, grouped by partner
    /// chromosome.
    pub fn query(&self, chr: Option<&Chromosome>, min_size: usize, max_p: f64) -> Vec<&Chs> {
        let hits: Vec<&Chs> = match chr {
            Some(chr) => self
                .index
                .partners(chr)
                .into_iter()
                .flat_map(|partner| self.between(chr, partner))
                .collect(),
            None => self.chs_list.iter().collect(),
        };

        hits.into_iter()
            .filter(|c| c.size >= min_size && c.p_value <= max_p)
            .collect()
    }
}

/// Computes sizes and p-values of CHS against a preprocessed genome.
///
/// `gap_num` is the maximum gap measured in genes.
pub struct Scorer<'a> {
    genome: &'a Genome,
    gap_num: usize,
}

impl<'a> Scorer<'a> {
    pub fn new(genome: &'a Genome, gap_num: usize) -> Self {
        Self { genome, gap_num }
    }

    pub fn score(&self, chs_list: Vec<Chs>) -> ScoredResult {
        let chs_list: Vec<Chs> = chs_list
            .into_iter()
            .map(|mut chs| {
                self.set_stat(&mut chs);
                chs
            })
            .collect();
        let index = ChsIndex::build(&chs_list);

        ScoredResult { chs_list, index }
    }

    /// Missing data gives size 0 and p-value 1.
    pub fn set_stat(&self, chs: &mut Chs) {
        let Some(genes) = self.gene_list(chs) else {
            log::debug!("No gene data for {}", chs);
            chs.size = 0;
            chs.p_value = 1.0;
            return;
        };

        let families = genes.families();
        chs.size = families.len();
        // sides are summed as logs
        chs.p_value = clamp_prob(
            self.ln_prob_of(&chs.chr_a.tax, &families) + self.ln_prob_of(&chs.chr_b.tax, &families),
        );
    }

    /// Collects the genes inside both ranges of a CHS and pairs them by
    /// family.
    ///
    /// Each range must start exactly at a gene of the ranked list.
    pub fn gene_list(&self, chs: &Chs) -> Option<ChsGenes> {
        let genes_a = self.genes_in(&chs.loc_a)?;
        let genes_b = self.genes_in(&chs.loc_b)?;

        let mut fam_of: HashMap<&str, Vec<&Gene>> = HashMap::new();
        for gene in &genes_b {
            if self.genome.is_null(&gene.family) {
                continue;
            }
            fam_of.entry(gene.family.as_str()).or_default().push(gene);
        }

        let mut matched_a = vec![];
        let mut matched_b = vec![];
        for gene_a in &genes_a {
            if let Some(partners) = fam_of.get(gene_a.family.as_str()) {
                for gene_b in partners {
                    matched_a.push(gene_a.clone());
                    matched_b.push((*gene_b).clone());
                }
            }
        }

        Some(ChsGenes {
            genes_a,
            genes_b,
            matched_a,
            matched_b,
        })
    }

    fn genes_in(&self, loc: &Loc) -> Option<Vec<Gene>> {
        let list = self.genome.ranked_of(&loc.chr)?;
        let idx = list.partition_point(|g| g.start() < loc.start);
        if list.get(idx)?.start() != loc.start {
            return None;
        }

        let genes = list[idx..]
            .iter()
            .take_while(|g| g.start() < loc.end)
            .filter(|g| g.end() <= loc.end)
            .cloned()
            .collect();
        Some(genes)
    }

    /// Probability of a cluster of these families arising by chance in the
    /// genome of `tax`.
    pub fn prob(&self, tax: &str, families: &BTreeSet<&str>) -> f64 {
        clamp_prob(self.ln_prob_of(tax, families))
    }

    // Natural log of `prob`, capped at 0 but not floored.
    fn ln_prob_of(&self, tax: &str, families: &BTreeSet<&str>) -> f64 {
        let n = self.genome.gene_num_of(tax);
        let mut p = ln_prob(n, families.len(), self.gap_num);

        // a family with several members raises the chance of a match
        for fam in families {
            if let Some(cnt) = self.genome.fam_num_of(tax, fam) {
                p += (cnt as f64).ln();
            }
        }

        if p.is_nan() || p > 0.0 {
            0.0
        } else {
            p
        }
    }

    /// Narrows a CHS to 1-based rank windows inside its current gene lists.
    ///
    /// A window with `start > end` is rejected.
    pub fn sub_chs(
        &self,
        chs: &Chs,
        start_a: usize,
        end_a: usize,
        start_b: usize,
        end_b: usize,
    ) -> Result<Chs, ChsError> {
        let genes = self
            .gene_list(chs)
            .ok_or_else(|| ChsError::MissingGenes(chs.to_string()))?;

        let loc_a = self.rank_window(&chs.chr_a, &genes.genes_a, start_a, end_a)?;
        let loc_b = self.rank_window(&chs.chr_b, &genes.genes_b, start_b, end_b)?;

        let mut sub = Chs::new(&chs.chr_a, &chs.chr_b, loc_a, loc_b);
        self.set_stat(&mut sub);
        Ok(sub)
    }

    fn rank_window(
        &self,
        chr: &Chromosome,
        genes: &[Gene],
        start: usize,
        end: usize,
    ) -> Result<Loc, ChsError> {
        if start > end {
            return Err(ChsError::ReversedRanks { start, end });
        }
        let (Some(first), Some(last)) = (genes.first(), genes.last()) else {
            return Err(ChsError::MissingGenes(chr.to_string()));
        };
        let (min, max) = (first.rank, last.rank);
        for rank in [start, end] {
            if rank < min || rank > max {
                return Err(ChsError::RankOutOfRange { rank, min, max });
            }
        }

        let list = self
            .genome
            .ranked_of(chr)
            .ok_or_else(|| ChsError::MissingGenes(chr.to_string()))?;
        Ok(Loc::new(chr, list[start - 1].start(), list[end - 1].end()))
    }

    /// Writes CHS lines; with `with_genes`, each CHS line gets a `>` prefix
    /// and is followed by its matched gene pairs.
    pub fn write_chs(
        &self,
        writer: &mut dyn Write,
        chs_list: &[Chs],
        with_genes: bool,
    ) -> std::io::Result<()> {
        writeln!(writer, "{}", CHS_HEADER)?;
        if !with_genes {
            for chs in chs_list {
                writeln!(writer, "{}", chs)?;
            }
            return Ok(());
        }

        writeln!(writer, "{}", PAIR_HEADER)?;
        for chs in chs_list {
            writeln!(writer, ">{}", chs)?;
            let Some(genes) = self.gene_list(chs) else {
                continue;
            };
            for (a, b) in genes.matched_a.iter().zip(&genes.matched_b) {
                writeln!(writer, " {}\t{}\t{}\t{}", a.id, a.symbol, b.id, b.symbol)?;
            }
        }
        Ok(())
    }
}

/// `ln(n - k + 1 - (k - 1) * d / 2) + (k - 1) * ln(d + 1) - ln C(n, k)`
///
/// Degenerate inputs return `0.0`, a probability of 1.
///
/// ```
/// # use chsm::libs::stat::ln_prob;
/// // n = 10, k = 3, d = 3: 5 * 16 / 120
/// assert!((ln_prob(10, 3, 3).exp() - 2.0 / 3.0).abs() < 1e-10);
/// // the window term is not positive
/// assert_eq!(ln_prob(5, 3, 3), 0.0);
/// ```
pub fn ln_prob(n: usize, k: usize, d: usize) -> f64 {
    if k == 0 || n < k {
        return 0.0;
    }
    let (n, k, d) = (n as i64, k as i64, d as i64);

    let window = n - k + 1 - (k - 1) * d / 2;
    if window <= 0 {
        return 0.0;
    }

    (window as f64).ln() + (k - 1) as f64 * ((d + 1) as f64).ln() - ln_combination(n, k)
}

/// Logarithm of the binomial coefficient, summed term by term.
///
/// ```
/// # use chsm::libs::stat::ln_combination;
/// assert!((ln_combination(10, 3) - 120f64.ln()).abs() < 1e-10);
/// assert_eq!(ln_combination(10, 0), 0.0);
/// ```
pub fn ln_combination(n: i64, k: i64) -> f64 {
    (0..k)
        .map(|i| ((n - i) as f64).ln() - ((k - i) as f64).ln())
        .sum()
}

/// Converts a log probability into `[f64::MIN_POSITIVE, 1]`.
fn clamp_prob(ln_p: f64) -> f64 {
    if ln_p.is_nan() || ln_p >= 0.0 {
        return 1.0;
    }
    ln_p.exp().max(f64::MIN_POSITIVE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::greedy::GreedyAlg;
    use approx::assert_relative_eq;

    fn chromosome(
        tax: &str,
        name: &str,
        families: &[&str],
        pos: &[i64],
    ) -> (Chromosome, Vec<Gene>) {
        let chr = Chromosome::new(tax, name);
        let genes = families
            .iter()
            .zip(pos)
            .enumerate()
            .map(|(i, (fam, p))| {
                let id = format!("{}{}{}", tax, name, i + 1);
                Gene::new(&id, fam, &id, &chr, "+", *p, p + 99)
            })
            .collect();
        (chr, genes)
    }

    const POS: [i64; 5] = [1, 201, 1001, 1201, 1401];

    fn five_genes() -> (Genome, Chromosome, Chromosome) {
        let (hs, l1) = chromosome("Hs", "1", &["A", "B", "C", "D", "E"], &POS);
        let (mm, l2) = chromosome("Mm", "1", &["A", "B", "C", "X", "Y"], &POS);
        let genome = Genome::new([(hs.clone(), l1), (mm.clone(), l2)].into(), false, "0");
        (genome, hs, mm)
    }

    fn pipeline(genome: &Genome, hs: &Chromosome, mm: &Chromosome, size: usize, gap: i64) -> ScoredResult {
        let alg = GreedyAlg::new(size, gap);
        let found = alg.search(
            hs,
            mm,
            genome.filtered_of(hs).unwrap(),
            genome.filtered_of(mm).unwrap(),
        );
        Scorer::new(genome, 3).score(found)
    }

    #[test]
    fn test_end_to_end() {
        let (genome, hs, mm) = five_genes();

        let res = pipeline(&genome, &hs, &mm, 2, 1000);
        assert_eq!(res.chs_list.len(), 1);
        let chs = &res.chs_list[0];
        assert_eq!(chs.size, 3);
        assert_eq!((chs.loc_a.start, chs.loc_a.end), (1, 1100));
        assert!(chs.p_value > 0.0 && chs.p_value <= 1.0);

        let genes = Scorer::new(&genome, 3).gene_list(chs).unwrap();
        assert_eq!(genes.genes_a.len(), 3);
        let ids: Vec<&str> = genes.matched_b.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["Mm11", "Mm12", "Mm13"]);

        let res = pipeline(&genome, &hs, &mm, 2, 500);
        assert_eq!(res.chs_list.len(), 1);
        assert_eq!(res.chs_list[0].size, 2);

        let res = pipeline(&genome, &hs, &mm, 4, 1000);
        assert!(res.chs_list.is_empty());
    }

    #[test]
    fn test_index() {
        let (genome, hs, mm) = five_genes();
        let res = pipeline(&genome, &hs, &mm, 2, 1000);

        assert_eq!(res.between(&hs, &mm).len(), 1);
        assert_eq!(res.between(&mm, &hs).len(), 1);
        assert_eq!(res.index.partners(&mm), vec![&hs]);
        assert!(res.between(&hs, &hs).is_empty());
        assert!(res.index.partners(&Chromosome::new("Rn", "1")).is_empty());
    }

    #[test]
    fn test_query() {
        let (hs1, l1) = chromosome("Hs", "1", &["A", "B", "C", "D", "E"], &POS);
        let (hs2, l2) = chromosome("Hs", "2", &["P", "Q", "D", "E", "R"], &POS);
        let (mm, l3) = chromosome("Mm", "1", &["A", "B", "C", "X", "Y"], &POS);
        let genome = Genome::new(
            [(hs1.clone(), l1), (hs2.clone(), l2), (mm.clone(), l3)].into(),
            false,
            "0",
        );
        let alg = GreedyAlg::new(2, 1000);
        let mut found = alg.search(
            &hs1,
            &mm,
            genome.filtered_of(&hs1).unwrap(),
            genome.filtered_of(&mm).unwrap(),
        );
        found.extend(alg.search(
            &hs1,
            &hs2,
            genome.filtered_of(&hs1).unwrap(),
            genome.filtered_of(&hs2).unwrap(),
        ));
        let res = Scorer::new(&genome, 3).score(found);
        assert_eq!(res.chs_list.len(), 2);

        // Hs1 links to both, Hs2 and Mm only to Hs1
        assert_eq!(res.query(Some(&hs1), 0, 1.0).len(), 2);
        assert_eq!(res.query(Some(&hs2), 0, 1.0).len(), 1);
        assert_eq!(res.query(Some(&mm), 0, 1.0)[0].size, 3);
        assert!(res.query(Some(&Chromosome::new("Rn", "1")), 0, 1.0).is_empty());

        // A B C against Mm has 3 families, D E against Hs2 has 2
        assert_eq!(res.query(Some(&hs1), 3, 1.0).len(), 1);
        assert_eq!(res.query(None, 2, 1.0).len(), 2);
        assert!(res.query(None, 0, 0.0).is_empty());
    }

    #[test]
    fn test_ln_prob_monotonic() {
        let mut last = 1.0;
        for k in 1..=12 {
            let p = clamp_prob(ln_prob(1000, k, 30));
            assert!(p > 0.0 && p <= 1.0);
            assert!(p <= last, "k = {}: {} > {}", k, p, last);
            last = p;
        }
    }

    #[test]
    fn test_large_segment_stays_positive() {
        let n = 20000;
        let pos: Vec<i64> = (0..n).map(|i| i * 1000 + 1).collect();
        let fams: Vec<String> = (0..n).map(|i| format!("F{}", i)).collect();
        let fams: Vec<&str> = fams.iter().map(|f| f.as_str()).collect();

        let (hs, l1) = chromosome("Hs", "1", &fams, &pos);
        let (mm, l2) = chromosome("Mm", "1", &fams, &pos);
        let genome = Genome::new([(hs.clone(), l1), (mm.clone(), l2)].into(), false, "0");
        let scorer = Scorer::new(&genome, 30);

        let mut last = 1.0;
        for k in [100i64, 150, 200] {
            let end = (k - 1) * 1000 + 100;
            let mut chs = Chs::new(&hs, &mm, Loc::new(&hs, 1, end), Loc::new(&mm, 1, end));
            scorer.set_stat(&mut chs);

            assert_eq!(chs.size, k as usize);
            assert!(chs.p_value > 0.0, "k = {}: {}", k, chs.p_value);
            assert!(chs.p_value.is_normal());
            assert!(chs.p_value <= last);
            last = chs.p_value;
        }
        assert_eq!(last, f64::MIN_POSITIVE);
        assert_ne!(format!("{:.3E}", last), "0.000E0");
    }

    #[test]
    fn test_ln_prob_value() {
        // n = 100, k = 4, d = 10: (100 - 4 + 1 - 15) * 11^3 / C(100, 4)
        let expected = 82.0 * 1331.0 / 3_921_225.0;
        assert_relative_eq!(ln_prob(100, 4, 10).exp(), expected, epsilon = 1e-12);
        assert_relative_eq!(ln_combination(100, 4), 3_921_225f64.ln(), epsilon = 1e-9);
    }

    #[test]
    fn test_ln_prob_degenerate() {
        assert_eq!(ln_prob(100, 0, 10), 0.0);
        assert_eq!(ln_prob(3, 5, 10), 0.0);
        assert_eq!(ln_prob(10, 5, 30), 0.0);
        assert_eq!(clamp_prob(ln_prob(10, 5, 30)), 1.0);
        assert_eq!(clamp_prob(2.0), 1.0);
        assert_eq!(clamp_prob(f64::NAN), 1.0);
        assert_eq!(clamp_prob(-1e6), f64::MIN_POSITIVE);
    }

    #[test]
    fn test_family_correction() {
        let pos: Vec<i64> = (0..20).map(|i| i * 1000 + 1).collect();
        let mut fams_a = vec!["A", "B"];
        fams_a.extend(std::iter::repeat("0").take(18));
        let mut fams_b = vec!["A", "B", "A"];
        fams_b.extend(std::iter::repeat("0").take(17));

        let (hs, l1) = chromosome("Hs", "1", &fams_a, &pos);
        let (mm, l2) = chromosome("Mm", "1", &fams_b, &pos);
        let genome = Genome::new([(hs.clone(), l1), (mm.clone(), l2)].into(), false, "0");
        let scorer = Scorer::new(&genome, 1);

        let families: BTreeSet<&str> = ["A", "B"].into();
        // n = 20, k = 2, d = 1: 19 * 2 / 190
        let base = 0.2;
        assert_relative_eq!(scorer.prob("Hs", &families), base, epsilon = 1e-12);
        // family A has two copies in Mm
        assert_relative_eq!(scorer.prob("Mm", &families), base * 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_missing_data() {
        let (genome, hs, mm) = five_genes();
        let scorer = Scorer::new(&genome, 3);

        // start does not hit a gene
        let chs = Chs::new(&hs, &mm, Loc::new(&hs, 2, 300), Loc::new(&mm, 1, 300));
        assert!(scorer.gene_list(&chs).is_none());

        let rn = Chromosome::new("Rn", "1");
        let chs = Chs::new(&hs, &rn, Loc::new(&hs, 1, 300), Loc::new(&rn, 1, 300));
        assert!(scorer.gene_list(&chs).is_none());

        let res = scorer.score(vec![chs]);
        assert_eq!(res.chs_list[0].size, 0);
        assert_eq!(res.chs_list[0].p_value, 1.0);
    }

    #[test]
    fn test_write_chs() {
        let (genome, hs, mm) = five_genes();
        let res = pipeline(&genome, &hs, &mm, 2, 1000);
        let scorer = Scorer::new(&genome, 3);

        let mut buf: Vec<u8> = vec![];
        scorer.write_chs(&mut buf, &res.chs_list, false).unwrap();
        let out = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "Hs\t1\t1\t1100\tMm\t1\t1\t1100\t3\t1.000E0");

        let mut buf: Vec<u8> = vec![];
        scorer.write_chs(&mut buf, &res.chs_list, true).unwrap();
        let out = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[2].starts_with(">Hs\t1\t1\t1100"));
        assert_eq!(lines[3], " Hs11\tHs11\tMm11\tMm11");
    }

    #[test]
    fn test_sub_chs() {
        let (genome, hs, mm) = five_genes();
        let res = pipeline(&genome, &hs, &mm, 2, 1000);
        let scorer = Scorer::new(&genome, 3);

        let sub = scorer.sub_chs(&res.chs_list[0], 2, 3, 2, 3).unwrap();
        assert_eq!((sub.loc_a.start, sub.loc_a.end), (201, 1100));
        assert_eq!((sub.loc_b.start, sub.loc_b.end), (201, 1100));
        assert_eq!(sub.size, 2);

        let err = scorer.sub_chs(&res.chs_list[0], 1, 4, 1, 3).unwrap_err();
        assert!(matches!(
            err,
            ChsError::RankOutOfRange {
                rank: 4,
                min: 1,
                max: 3
            }
        ));

        let err = scorer.sub_chs(&res.chs_list[0], 1, 3, 3, 2).unwrap_err();
        assert!(matches!(err, ChsError::ReversedRanks { start: 3, end: 2 }));
    }
}
