use clap::*;
use itertools::Itertools;
use std::io::Write;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    let cmd = Command::new("prep")
        .about("Ranked gene lists and gene statistics")
        .after_help(
            r###"
Sorts the genes of each chromosome by position and numbers them from 1.
With --tandem, runs of adjacent genes of the same family collapse into one
ranked gene whose symbol gets the suffix `_cluster`.

Output modes:
* default   - ranked genes, the rank appended as a ninth column
* --filter  - ranked genes without the null family
* --chrs    - species, chromosome, length and number of ranked genes
* --stats   - per-species counts and the mean gene length

Examples:
1. Ranked genes with tandem duplicates merged:
   chsm prep tests/chsm/genes.tsv --tandem

2. Chromosome lengths:
   chsm prep tests/chsm/genes.tsv --chrs

3. Counts used by the p-value:
   chsm prep tests/chsm/genes.tsv --stats

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
            Arg::new("filter")
                .long("filter")
                .action(ArgAction::SetTrue)
                .help("Drop genes of the null family"),
        )
        .arg(
            Arg::new("chrs")
                .long("chrs")
                .action(ArgAction::SetTrue)
                .conflicts_with_all(["filter", "stats"])
                .help("Report chromosomes instead of genes"),
        )
        .arg(
            Arg::new("stats")
                .long("stats")
                .action(ArgAction::SetTrue)
                .conflicts_with("filter")
                .help("Report per-species counts instead of genes"),
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
    let mut writer = chsm::writer(args.get_one::<String>("outfile").unwrap())?;

    //----------------------------
    // Ops
    //----------------------------
    let genome = super::load_genome(infile, args)?;

    if args.get_flag("stats") {
        let chr_num = genome.chromosomes().iter().counts_by(|c| c.tax.clone());

        writer.write_fmt(format_args!(
            "{}\n",
            ["#Species", "Chromosomes", "Genes", "Families"].iter().join("\t")
        ))?;
        for (tax, gene_num) in genome.gene_num() {
            let row = [
                tax.clone(),
                chr_num.get(tax).copied().unwrap_or(0).to_string(),
                gene_num.to_string(),
                genome.families_of(tax).to_string(),
            ];
            writer.write_fmt(format_args!("{}\n", row.iter().join("\t")))?;
        }
        writer.write_fmt(format_args!("#Mean gene length\t{}\n", genome.mean_len()))?;
    } else if args.get_flag("chrs") {
        writer.write_all(b"#Species\tChromosome\tLength\tGenes\n")?;
        for (chr, genes) in genome.ranked() {
            writer.write_fmt(format_args!("{}\t{}\t{}\n", chr, chr.length, genes.len()))?;
        }
    } else {
        let lists = if args.get_flag("filter") {
            genome.filtered()
        } else {
            genome.ranked()
        };
        writer.write_all(
            b"#GeneID\tFamilyID\tSymbol\tSpecies\tChromosome\tOrient\tStart\tEnd\tRank\n",
        )?;
        for gene in lists.values().flatten() {
            writer.write_fmt(format_args!("{}\n", gene))?;
        }
    }

    Ok(())
}
