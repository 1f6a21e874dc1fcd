//! Subcommand modules for the `chsm` binary.

use clap::*;

pub mod compare;
pub mod prep;
pub mod search;
pub mod slice;
pub mod stat;

/// `--tandem` and `--null`, shared by every command that preprocesses genes.
pub fn genome_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("tandem")
            .long("tandem")
            .action(ArgAction::SetTrue)
            .help("Merge runs of adjacent same-family genes"),
    )
    .arg(
        Arg::new("null")
            .long("null")
            .num_args(1)
            .default_value("0")
            .help("Family id of genes without a known family"),
    )
    .arg(
        Arg::new("exclude")
            .long("exclude")
            .short('x')
            .num_args(1)
            .action(ArgAction::Append)
            .help("Leave out a species (TAX) or a chromosome (TAX:NAME). Can be repeated"),
    )
}

/// Reads a gene file and preprocesses it with `--tandem`, `--null` and
/// `--exclude`.
pub fn load_genome(infile: &str, args: &ArgMatches) -> anyhow::Result<chsm::libs::prep::Genome> {
    let opt_tandem = args.get_flag("tandem");
    let opt_null = args.get_one::<String>("null").unwrap();
    let excludes: Vec<&String> = args
        .get_many::<String>("exclude")
        .map(|v| v.collect())
        .unwrap_or_default();

    let reader = chsm::reader(infile)?;
    let mut chr_map = chsm::libs::gene::read_genes(reader)?;
    log::info!("Read {} chromosomes from {}", chr_map.len(), infile);

    if !excludes.is_empty() {
        chr_map.retain(|chr, _| !excludes.iter().any(|p| chr.matches(p)));
        log::info!("{} chromosomes left after --exclude", chr_map.len());
    }

    Ok(chsm::libs::prep::Genome::new(chr_map, opt_tandem, opt_null))
}
