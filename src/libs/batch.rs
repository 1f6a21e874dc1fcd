use crate::libs::chs::Chs;
use crate::libs::greedy::GreedyAlg;
use crate::libs::loc::Chromosome;
use crate::libs::prep::Genome;
use crossbeam::channel::Sender;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Which chromosome pairs are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairMode {
    /// Same species, a chromosome against itself included
    Intra,
    /// Different species
    Inter,
}

impl PairMode {
    pub fn accepts(&self, chr1: &Chromosome, chr2: &Chromosome) -> bool {
        match self {
            PairMode::Intra => chr1.same_tax(chr2),
            PairMode::Inter => !chr1.same_tax(chr2),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub chs_list: Vec<Chs>,
    pub total: usize,
    pub completed: usize,
    pub cancelled: bool,
}

/// Pairs `(chrs[i], chrs[j])` with `j <= i` accepted by `mode`.
pub fn chr_pairs<'a>(chrs: &[&'a Chromosome], mode: PairMode) -> Vec<(&'a Chromosome, &'a Chromosome)> {
    let mut pairs = vec![];
    for i in 0..chrs.len() {
        for j in 0..=i {
            if mode.accepts(chrs[i], chrs[j]) {
                pairs.push((chrs[i], chrs[j]));
            }
        }
    }
    pairs
}

/// Searches every chromosome pair of the genome.
///
/// `cancel` is checked before each pair; pairs already searched are kept.
/// Each finished pair sends one message on `progress`, and the sender is
/// dropped when the batch returns.
pub fn run(
    genome: &Genome,
    alg: &GreedyAlg,
    mode: PairMode,
    cancel: &AtomicBool,
    progress: Option<Sender<usize>>,
) -> BatchOutcome {
    let chrs = genome.chromosomes();
    let pairs = chr_pairs(&chrs, mode);
    let total = pairs.len();
    let completed = AtomicUsize::new(0);

    log::info!("Search {} chromosome pairs", total);

    let found: Vec<Vec<Chs>> = pairs
        .par_iter()
        .map(|(chr1, chr2)| {
            if cancel.load(Ordering::Relaxed) {
                return vec![];
            }
            let (Some(list1), Some(list2)) = (genome.filtered_of(chr1), genome.filtered_of(chr2))
            else {
                return vec![];
            };

            let res = alg.search(chr1, chr2, list1, list2);

            let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(tx) = &progress {
                // the receiver may be gone
                let _ = tx.send(done);
            }
            res
        })
        .collect();

    let mut chs_list: Vec<Chs> = found.into_iter().flatten().collect();
    chs_list.sort_by(|a, b| a.cmp_pos(b));

    let completed = completed.into_inner();
    let cancelled = completed < total && cancel.load(Ordering::Relaxed);
    if cancelled {
        log::warn!("Cancelled after {} of {} pairs", completed, total);
    }

    BatchOutcome {
        chs_list,
        total,
        completed,
        cancelled,
    }
}
