use clap::{arg, Arg, ArgAction, Command};

pub const ANNOTATE_CMD: &str = "annotate";

pub fn create_annotate_cli() -> Command {
    Command::new(ANNOTATE_CMD)
        .about("Annotate a VCF with GA4GH VRS allele identifiers.")
        .arg(arg!(<VCF_IN> "Input VCF (plain or gzipped)"))
        .arg(
            Arg::new("dataproxy_uri")
                .long("dataproxy_uri")
                .help(
                    "Sequence repository URI (e.g. seqrepo+file:///path, \
                     seqrepo+http://localhost:5000/seqrepo). Takes priority over \
                     the GA4GH_VRS_DATAPROXY_URI environment variable.",
                ),
        )
        .arg(
            Arg::new("assembly")
                .long("assembly")
                .default_value("GRCh38")
                .help("Assembly used to resolve the VCF chromosome names"),
        )
        .arg(
            Arg::new("vrs_attributes")
                .long("vrs_attributes")
                .action(ArgAction::SetTrue)
                .help("Also emit VRS_Start, VRS_End, and VRS_State INFO fields"),
        )
        .arg(
            Arg::new("skip_ref")
                .long("skip_ref")
                .action(ArgAction::SetTrue)
                .help("Do not compute identifiers for REF alleles, only ALT"),
        )
        .arg(
            Arg::new("require_validation")
                .long("require_validation")
                .action(ArgAction::SetTrue)
                .help("Reject records whose REF disagrees with the repository (halts on first failure)"),
        )
        .arg(
            Arg::new("vcf_out")
                .long("vcf_out")
                .help("Path for the annotated VCF (gzipped when it ends in .gz)"),
        )
        .arg(
            Arg::new("ndjson_out")
                .long("ndjson_out")
                .help("Path for an NDJSON stream of the computed VRS objects"),
        )
}
