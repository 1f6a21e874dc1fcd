use clap::*;

use chsm::libs::chs::Chs;
use chsm::libs::loc::Chromosome;
use chsm::libs::stat::Scorer;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    let cmd = Command::new("stat")
        .about("Recompute sizes and p-values of segments")
        .after_help(
            r###"
Reads segments produced elsewhere, e.g. by an earlier `chsm search` or by
another tool, and scores them against a gene file.

A segment counts the families shared by its two regions. Each region must
start exactly at a gene; otherwise the segment gets size 0 and p-value 1.

The p-value of one side with n genes, k families and a gap of d genes is

    (n - k + 1 - (k - 1) * d / 2) * (d + 1) ^ (k - 1) / C(n, k)

multiplied by the number of copies of each family, and capped at 1. The
segment p-value is the product of both sides, never below the smallest
positive double.

--chr, --min-size and --max-p filter the rescored segments. With --chr, the
segments are grouped by partner chromosome.

Examples:
1. Rescore with the default gap:
   chsm stat tests/chsm/genes.tsv tests/chsm/inter.tsv

2. Rescore and list the gene pairs:
   chsm stat tests/chsm/genes.tsv tests/chsm/inter.tsv --gap 3 --genes

3. Segments of one chromosome, at least 3 families:
   chsm stat tests/chsm/genes.tsv tests/chsm/inter.tsv --chr Mm:7 --min-size 3

"###,
        )
        .arg(
            Arg::new("infile")
                .required(true)
                .num_args(1)
                .index(1)
                .help("Input gene file"),
        )
        .arg(
            Arg::new("chs")
                .required(true)
                .num_args(1)
                .index(2)
                .help("Input segment file. [stdin] for standard input"),
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
            Arg::new("chr")
                .long("chr")
                .num_args(1)
                .value_parser(value_parser!(Chromosome))
                .help("Only segments touching this chromosome, as TAX:NAME"),
        )
        .arg(
            Arg::new("min_size")
                .long("min-size")
                .value_parser(value_parser!(usize))
                .num_args(1)
                .default_value("0")
                .help("Minimum size of reported segments"),
        )
        .arg(
            Arg::new("max_p")
                .long("max-p")
                .value_parser(value_parser!(f64))
                .num_args(1)
                .default_value("1")
                .help("Maximum p-value of reported segments"),
        )
        .arg(
            Arg::new("genes")
                .long("genes")
                .action(ArgAction::SetTrue)
                .help("Append matched gene pairs to each segment"),
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
    let opt_gap = *args.get_one::<usize>("gap").unwrap();
    let opt_genes = args.get_flag("genes");
    let opt_chr = args.get_one::<Chromosome>("chr");
    let opt_min_size = *args.get_one::<usize>("min_size").unwrap();
    let opt_max_p = *args.get_one::<f64>("max_p").unwrap();

    //----------------------------
    // Ops
    //----------------------------
    let genome = super::load_genome(infile, args)?;
    let chs_list = chsm::libs::chs::read_chs(chsm::reader(args.get_one::<String>("chs").unwrap())?)?;

    let scorer = Scorer::new(&genome, opt_gap);
    let result = scorer.score(chs_list);

    let missing = result.chs_list.iter().filter(|c| c.size == 0).count();
    if missing > 0 {
        log::warn!("{} segments do not start at a gene", missing);
    }

    let selected: Vec<Chs> = result
        .query(opt_chr, opt_min_size, opt_max_p)
        .into_iter()
        .cloned()
        .collect();

    //----------------------------
    // Output
    //----------------------------
    let mut writer = chsm::writer(args.get_one::<String>("outfile").unwrap())?;
    scorer.write_chs(&mut writer, &selected, opt_genes)?;

    Ok(())
}
