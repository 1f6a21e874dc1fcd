use clap::*;

use chsm::libs::stat::Scorer;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    let cmd = Command::new("slice")
        .about("Narrow a segment to rank windows")
        .after_help(
            r###"
Picks one segment from the segment file and replaces each of its regions by
the genes between two ranks. Ranks are 1-based positions on the chromosome
and must lie inside the genes already covered by that region. The reduced
segment is scored again.

Examples:
1. Keep ranks 2-3 of both regions of the first segment:
   chsm slice tests/chsm/genes.tsv tests/chsm/inter.tsv --ranks 2,3,2,3

2. The second segment, with gene pairs:
   chsm slice tests/chsm/genes.tsv tests/chsm/inter.tsv -n 2 --ranks 2,2,3,3 --genes

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
            Arg::new("num")
                .long("num")
                .short('n')
                .value_parser(value_parser!(usize))
                .num_args(1)
                .default_value("1")
                .help("1-based index of the segment in the file"),
        )
        .arg(
            Arg::new("ranks")
                .long("ranks")
                .required(true)
                .num_args(1)
                .value_delimiter(',')
                .value_parser(value_parser!(usize))
                .help("Start and end ranks of region A, then of region B"),
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
            Arg::new("genes")
                .long("genes")
                .action(ArgAction::SetTrue)
                .help("Append matched gene pairs to the segment"),
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
    let opt_num = *args.get_one::<usize>("num").unwrap();
    let opt_gap = *args.get_one::<usize>("gap").unwrap();
    let opt_genes = args.get_flag("genes");
    let ranks: Vec<usize> = args.get_many::<usize>("ranks").unwrap().copied().collect();
    if ranks.len() != 4 {
        anyhow::bail!("--ranks needs 4 values, got {}", ranks.len());
    }

    //----------------------------
    // Ops
    //----------------------------
    let genome = super::load_genome(infile, args)?;
    let chs_list = chsm::libs::chs::read_chs(chsm::reader(args.get_one::<String>("chs").unwrap())?)?;

    let chs = opt_num
        .checked_sub(1)
        .and_then(|i| chs_list.get(i))
        .ok_or_else(|| {
            anyhow::anyhow!("No segment {} among {} segments", opt_num, chs_list.len())
        })?;

    let scorer = Scorer::new(&genome, opt_gap);
    let sub = scorer.sub_chs(chs, ranks[0], ranks[1], ranks[2], ranks[3])?;

    //----------------------------
    // Output
    //----------------------------
    let mut writer = chsm::writer(args.get_one::<String>("outfile").unwrap())?;
    scorer.write_chs(&mut writer, &[sub], opt_genes)?;

    Ok(())
}
