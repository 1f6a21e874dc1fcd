use clap::*;
use std::sync::atomic::AtomicBool;

use chsm::libs::batch::{self, PairMode};
use chsm::libs::greedy::GreedyAlg;
use chsm::libs::stat::Scorer;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    let cmd = Command::new("search")
        .about("Search homology segments between chromosomes")
        .after_help(
            r###"
Every pair of chromosomes is searched with a greedy seed-and-extend pass:
* Genes of the same family on both chromosomes seed a segment
* The segment grows while the next gene stays within the gap on both sides
* Segments with at least --size families are kept, then overlapping or
  adjacent ones are merged

The gap is given in genes and converted to bp with the mean gene length.

By default chromosomes of the same species are compared, a chromosome against
itself included. With --inter, only chromosomes of different species are
compared.

Input format (tab separated, .gz accepted):
    geneID  familyID  symbol  species  chromosome  orient  start  end

Examples:
1. Segments within each species:
   chsm search tests/chsm/genes.tsv

2. Segments between species, at least 3 families, gap of 10 genes:
   chsm search tests/chsm/genes.tsv --inter --size 3 --gap 10

3. List the matched gene pairs of each segment:
   chsm search tests/chsm/genes.tsv --inter --genes -o out.tsv

4. Leave out a chromosome before ranking and counting:
   chsm search tests/chsm/genes.tsv --inter --exclude Hs:2

"###,
        )
        .arg(
            Arg::new("infile")
                .required(true)
                .num_args(1)
                .index(1)
                .help("Input gene file. [stdin] for standard input"),
        )
        .arg(
            Arg::new("size")
                .long("size")
                .short('s')
                .value_parser(value_parser!(usize))
                .num_args(1)
                .default_value("2")
                .help("Minimum number of families in a segment"),
        )
        .arg(
            Arg::new("gap")
                .long("gap")
                .short('g')
                .value_parser(value_parser!(usize))
                .num_args(1)
                .default_value("30")
                .help("Maximum gap between linked genes, in genes"),
        )
        .arg(
            Arg::new("inter")
                .long("inter")
                .action(ArgAction::SetTrue)
                .help("Compare chromosomes of different species"),
        )
        .arg(
            Arg::new("genes")
                .long("genes")
                .action(ArgAction::SetTrue)
                .help("Append matched gene pairs to each segment"),
        )
        .arg(
            Arg::new("parallel")
                .long("parallel")
                .short('p')
                .value_parser(value_parser!(usize))
                .num_args(1)
                .default_value("1")
                .help("Number of threads for parallel processing"),
        )
        .arg(
            Arg::new("outfile")
                .long("outfile")
                .short('o')
                .num_args(1)
                .default_value("stdout")
                .help("Output filename. [stdout] for screen"),
        );

    super::genome_args(cmd)
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    //----------------------------
    // Args
    //----------------------------
    let infile = args.get_one::<String>("infile").unwrap();
    let opt_size = *args.get_one::<usize>("size").unwrap();
    let opt_gap = *args.get_one::<usize>("gap").unwrap();
    let opt_genes = args.get_flag("genes");
    let opt_parallel = *args.get_one::<usize>("parallel").unwrap();

    let mode = if args.get_flag("inter") {
        PairMode::Inter
    } else {
        PairMode::Intra
    };

    rayon::ThreadPoolBuilder::new()
        .num_threads(opt_parallel)
        .build_global()?;

    //----------------------------
    // Ops
    //----------------------------
    let genome = super::load_genome(infile, args)?;
    let gap = genome.gap_distance(opt_gap);
    log::info!(
        "Mean gene length {}, gap {} genes = {} bp",
        genome.mean_len(),
        opt_gap,
        gap
    );

    let alg = GreedyAlg::new(opt_size, gap);
    let total = batch::chr_pairs(&genome.chromosomes(), mode).len();
    let cancel = AtomicBool::new(false);

    let (sender, receiver) = crossbeam::channel::unbounded::<usize>();
    let outcome = crossbeam::scope(|s| {
        // Progress reporter, ends when the batch drops the sender
        s.spawn(move |_| {
            let mut next = 10;
            for done in receiver.iter() {
                let pct = done * 100 / total.max(1);
                if pct >= next {
                    log::info!("{}/{} chromosome pairs searched", done, total);
                    next = pct / 10 * 10 + 10;
                }
            }
        });

        batch::run(&genome, &alg, mode, &cancel, Some(sender))
    })
    .map_err(|_| anyhow::anyhow!("Progress reporter panicked"))?;

    let scorer = Scorer::new(&genome, opt_gap);
    let result = scorer.score(outcome.chs_list);
    log::info!("Found {} segments", result.chs_list.len());

    //----------------------------
    // Output
    //----------------------------
    let mut writer = chsm::writer(args.get_one::<String>("outfile").unwrap())?;
    scorer.write_chs(&mut writer, &result.chs_list, opt_genes)?;

    Ok(())
}
