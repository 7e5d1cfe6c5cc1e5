use std::path::PathBuf;
use std::time::Instant;

use clap::ArgMatches;
use indicatif::{ProgressBar, ProgressStyle};

use vrs_core::VrsError;
use vrs_dataproxy::create_repository;
use vrs_translate::{VcfAnnotator, VcfAnnotatorConfig};

// Exit codes: 0 success, 2 CLI misuse, 3 data proxy unreachable,
// 4 per-record failures exceeded tolerance.
const EXIT_OK: i32 = 0;
const EXIT_USAGE: i32 = 2;
const EXIT_BACKEND: i32 = 3;
const EXIT_RECORDS: i32 = 4;

pub fn run_annotate(matches: &ArgMatches) -> i32 {
    let vcf_in = PathBuf::from(matches.get_one::<String>("VCF_IN").expect("required"));
    let vcf_out = matches.get_one::<String>("vcf_out").map(PathBuf::from);
    let ndjson_out = matches.get_one::<String>("ndjson_out").map(PathBuf::from);

    if vcf_out.is_none() && ndjson_out.is_none() {
        eprintln!("error: at least one of --vcf_out and --ndjson_out is required");
        return EXIT_USAGE;
    }

    let uri = matches.get_one::<String>("dataproxy_uri").map(String::as_str);
    let repo = match create_repository(uri) {
        Ok(repo) => repo,
        Err(VrsError::BackendUnavailable(e)) => {
            eprintln!("error: sequence repository is unreachable: {e}");
            return EXIT_BACKEND;
        }
        Err(e) => {
            eprintln!("error: {e}");
            return EXIT_USAGE;
        }
    };

    let config = VcfAnnotatorConfig {
        assembly: matches
            .get_one::<String>("assembly")
            .expect("defaulted")
            .clone(),
        vrs_attributes: matches.get_flag("vrs_attributes"),
        compute_for_ref: !matches.get_flag("skip_ref"),
        require_validation: matches.get_flag("require_validation"),
    };

    let spinner = ProgressBar::new_spinner().with_style(
        ProgressStyle::with_template("{spinner} {msg}").expect("static template"),
    );
    spinner.set_message(format!("annotating {}", vcf_in.display()));
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    let annotator = VcfAnnotator::new(repo.as_ref(), config);
    let started = Instant::now();
    let outcome = annotator.annotate(&vcf_in, vcf_out.as_deref(), ndjson_out.as_deref());
    spinner.finish_and_clear();

    match outcome {
        Ok(stats) => {
            log::info!(
                "annotated {} records ({} alleles, {} failures) in {:.2?}",
                stats.records,
                stats.alleles,
                stats.failures,
                started.elapsed()
            );
            println!(
                "{} records, {} alleles, {} failures",
                stats.records, stats.alleles, stats.failures
            );
            EXIT_OK
        }
        Err(VrsError::BackendUnavailable(e)) => {
            eprintln!("error: sequence repository became unavailable: {e}");
            EXIT_BACKEND
        }
        Err(e) => {
            eprintln!("error: {e}");
            EXIT_RECORDS
        }
    }
}
