use std::path::PathBuf;

use anyhow::Context;
use catalog::store::json::JsonStore;
use clap::{CommandFactory, FromArgMatches, Parser};
use runex::{available_structures, config::Config, die};
use workflow::{DispatchError, KpointMesh, Options};

/// run the example structures through SIESTA or FLEUR
#[derive(Parser, Debug)]
#[command(author, about, long_about = None)]
struct Args {
    /// The label of the code to run, as given in the [[code]] tables of the
    /// config file. A unique name before the `@` is also accepted.
    #[arg(short, long)]
    code: String,

    /// The label of the structure to run.
    #[arg(short, long, default_value_t = String::from("TiO2"))]
    structure: String,

    /// The k-point mesh.
    #[arg(short, long, num_args = 3, default_values_t = [4, 4, 4])]
    kpoints: Vec<usize>,

    /// The maximum wall-clock time of the run in seconds.
    #[arg(short = 'w', long, default_value_t = 1800)]
    max_wallclock_seconds: u64,

    /// The config file. Defaults are used if it doesn't exist.
    #[arg(long, default_value = DEFAULT_CONFIG)]
    config: PathBuf,

    /// Write the run directory but don't submit it. Defaults to false.
    #[arg(short = 'n', long, default_value_t = false)]
    dry_run: bool,

    /// Exit with an error when the code has no plugin instead of skipping it.
    /// Defaults to false.
    #[arg(long, default_value_t = false)]
    strict: bool,
}

/// exit status for a code with no plugin under --strict
const UNSUPPORTED: i32 = 2;

const DEFAULT_CONFIG: &str = "runex.toml";

/// parse the command line, listing the structures available under the
/// default config in the help for `--structure`
fn parse_args() -> Args {
    let mut cmd = Args::command();
    if let Ok(config) = Config::load(DEFAULT_CONFIG) {
        let available = available_structures(&config);
        if !available.is_empty() {
            cmd = cmd.mut_arg("structure", |a| {
                a.help(format!(
                    "The label of the structure to run. Available: {}",
                    available.join(", ")
                ))
            });
        }
    }
    Args::from_arg_matches(&cmd.get_matches()).unwrap_or_else(|e| e.exit())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = parse_args();
    let config = Config::load(&args.config)?;

    let mut store = JsonStore::open(&config.store)?;
    let catalog = catalog::ensure_catalog_in(
        &mut store,
        &config.catalog,
        &config.structures,
    )
    .with_context(|| format!("failed to load catalog {}", config.catalog))?;
    let record = catalog::find_record(&catalog, &args.structure)?;

    let registry = config.registry();
    let code = registry.resolve(&args.code)?;

    let [k1, k2, k3] = args.kpoints[..] else {
        die!("expected three k-points, got {:?}", args.kpoints);
    };
    let options =
        Options::new(KpointMesh([k1, k2, k3]), args.max_wallclock_seconds)
            .resources(config.resources);

    let run = match workflow::build_run(
        code,
        record,
        &options,
        &config.pseudo_families(),
    ) {
        Ok(run) => run,
        Err(e @ DispatchError::UnsupportedTarget(_)) => {
            eprintln!("{e}, skipping {}", code.label);
            if args.strict {
                std::process::exit(UNSUPPORTED);
            }
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let result = workflow::dispatch(&run, &config.runner(args.dry_run))?;
    println!("{}", run.description);
    match result.job_id {
        Some(id) => println!(
            "submitted {} as job {id} in {}",
            run.label,
            result.dir.display()
        ),
        None => println!("wrote {} to {}", run.label, result.dir.display()),
    }

    Ok(())
}
