mod annotate;

use clap::Command;

pub mod consts {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const BIN_NAME: &str = "vrs";
}

fn build_parser() -> Command {
    Command::new(consts::BIN_NAME)
        .bin_name(consts::BIN_NAME)
        .version(consts::VERSION)
        .about("GA4GH VRS tools: compute canonical variation identifiers and annotate VCFs.")
        .subcommand_required(true)
        .subcommand(annotate::cli::create_annotate_cli())
}

fn main() {
    env_logger::init();
    // clap itself exits with 2 on CLI misuse.
    let matches = build_parser().get_matches();

    let code = match matches.subcommand() {
        Some((annotate::cli::ANNOTATE_CMD, matches)) => annotate::handlers::run_annotate(matches),
        _ => unreachable!("Subcommand not found"),
    };
    std::process::exit(code);
}
