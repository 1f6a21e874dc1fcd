use clap::*;
use std::io::Write;

use chsm::libs::chs::read_chs;
use chsm::libs::compare::{homolog_pairs, Confusion};

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("compare")
        .about("Compare predicted segments with reference segments")
        .after_help(
            r###"
Each pair of genes of the same family, one from --tax-a and one from --tax-b,
is a homolog pair. A pair is linked by a segment set when some segment covers
both genes. The reference set splits the pairs into positives and negatives;
the predicted set is then scored against them.

Output:
    pairs       positive    negative
    positive    TP          FN
    negative    FP          TN
    #Sensitivity    TP / (TP + FN)
    #Specificity    TN / (TN + FP)

Examples:
1. Score a search against another synteny source:
   chsm compare tests/chsm/genes.tsv reference.tsv predicted.tsv --tax-a Hs --tax-b Mm

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
            Arg::new("reference")
                .required(true)
                .num_args(1)
                .index(2)
                .help("Reference segment file"),
        )
        .arg(
            Arg::new("predicted")
                .required(true)
                .num_args(1)
                .index(3)
                .help("Predicted segment file"),
        )
        .arg(
            Arg::new("tax_a")
                .long("tax-a")
                .required(true)
                .num_args(1)
                .help("First species"),
        )
        .arg(
            Arg::new("tax_b")
                .long("tax-b")
                .required(true)
                .num_args(1)
                .help("Second species"),
        )
        .arg(
            Arg::new("null")
                .long("null")
                .num_args(1)
                .default_value("0")
                .help("Family id of genes without a known family"),
        )
        .arg(
            Arg::new("outfile")
                .long("outfile")
                .short('o')
                .num_args(1)
                .default_value("stdout")
                .help("Output filename. [stdout] for screen"),
        )
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    //----------------------------
    // Args
    //----------------------------
    let tax_a = args.get_one::<String>("tax_a").unwrap();
    let tax_b = args.get_one::<String>("tax_b").unwrap();
    let opt_null = args.get_one::<String>("null").unwrap();

    //----------------------------
    // Ops
    //----------------------------
    let chr_map = chsm::libs::gene::read_genes(chsm::reader(
        args.get_one::<String>("infile").unwrap(),
    )?)?;
    let reference = read_chs(chsm::reader(args.get_one::<String>("reference").unwrap())?)?;
    let predicted = read_chs(chsm::reader(args.get_one::<String>("predicted").unwrap())?)?;

    let pairs = homolog_pairs(&chr_map, tax_a, tax_b, opt_null);
    log::info!("{} homolog pairs between {} and {}", pairs.len(), tax_a, tax_b);

    let confusion = Confusion::new(&reference, &predicted, &pairs);

    //----------------------------
    // Output
    //----------------------------
    let mut writer = chsm::writer(args.get_one::<String>("outfile").unwrap())?;
    writer.write_fmt(format_args!("{}", confusion))?;
    writer.write_fmt(format_args!("#Sensitivity\t{:.4}\n", confusion.sensitivity()))?;
    writer.write_fmt(format_args!("#Specificity\t{:.4}\n", confusion.specificity()))?;

    Ok(())
}
