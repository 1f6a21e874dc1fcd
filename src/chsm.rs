extern crate clap;
use clap::*;

mod cmd_chsm;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let app = Command::new("chsm")
        .version(crate_version!())
        .author(crate_authors!())
        .about("`chsm` - Chromosomal Homology Segment Miner")
        .propagate_version(true)
        .arg_required_else_help(true)
        .color(ColorChoice::Auto)
        .subcommand(cmd_chsm::prep::make_subcommand())
        .subcommand(cmd_chsm::search::make_subcommand())
        .subcommand(cmd_chsm::stat::make_subcommand())
        .subcommand(cmd_chsm::slice::make_subcommand())
        .subcommand(cmd_chsm::compare::make_subcommand())
        .after_help(
            r###"Subcommands:

* Genes:
    * prep    - Ranked or filtered gene lists, per-species counts

* Segments:
    * search  - Greedy search of homology segments between chromosomes
    * stat    - Recompute sizes and p-values of existing segments
    * slice   - Narrow a segment to rank windows

* Evaluation:
    * compare - Confusion table of predicted against reference segments

Log verbosity is controlled by RUST_LOG, e.g. RUST_LOG=debug.

"###,
        );

    // Check which subcommand the user ran...
    match app.get_matches().subcommand() {
        Some(("prep", sub_matches)) => cmd_chsm::prep::execute(sub_matches),
        Some(("search", sub_matches)) => cmd_chsm::search::execute(sub_matches),
        Some(("stat", sub_matches)) => cmd_chsm::stat::execute(sub_matches),
        Some(("slice", sub_matches)) => cmd_chsm::slice::execute(sub_matches),
        Some(("compare", sub_matches)) => cmd_chsm::compare::execute(sub_matches),
        _ => unreachable!(),
    }?;

    Ok(())
}
