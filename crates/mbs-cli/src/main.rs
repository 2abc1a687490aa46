use std::path::Path;
use std::process::ExitCode;

use mbs_cli::{Backend, GateRow, MatrixReport, Scenario, Target};
use tracing_subscriber::EnvFilter;

fn usage() {
    eprintln!("usage:");
    eprintln!("  mbs-cli assemble <scenario.json> [--backend csr|triplet|dense] [--kkt]");
    eprintln!("  mbs-cli inspect <scenario.json>");
}

/// Logs go to stderr so stdout stays machine-readable; `RUST_LOG` overrides the level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}

struct AssembleArgs<'a> {
    path: &'a Path,
    backend: Backend,
    target: Target,
}

fn parse_assemble_args(args: &[String]) -> Result<AssembleArgs<'_>, String> {
    let (path, rest) = args
        .split_first()
        .ok_or_else(|| "missing scenario path".to_string())?;
    let mut parsed = AssembleArgs {
        path: Path::new(path),
        backend: Backend::default(),
        target: Target::Jacobian,
    };

    let mut rest = rest.iter();
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--kkt" => parsed.target = Target::Kkt,
            "--backend" => {
                let name = rest
                    .next()
                    .ok_or_else(|| "--backend needs a value".to_string())?;
                parsed.backend = name.parse().map_err(|err| format!("{err}"))?;
            }
            other => return Err(format!("unexpected argument: {other}")),
        }
    }
    Ok(parsed)
}

fn assemble_file(args: &AssembleArgs<'_>) -> Result<(), String> {
    let scenario =
        Scenario::load(args.path).map_err(|err| format!("{}: {}", args.path.display(), err))?;
    let report = MatrixReport::assemble(&scenario, args.backend, args.target)
        .map_err(|err| format!("{}: {}", args.path.display(), err))?;
    let json = serde_json::to_string_pretty(&report)
        .map_err(|err| format!("failed to encode report: {err}"))?;
    println!("{json}");
    Ok(())
}

fn inspect_file(path: &Path) -> Result<(), String> {
    let scenario = Scenario::load(path).map_err(|err| format!("{}: {}", path.display(), err))?;
    let table = GateRow::table(&scenario).map_err(|err| format!("{}: {}", path.display(), err))?;

    println!("num_vars: {}", scenario.num_vars);
    println!("constraints: {}", table.len());
    println!("active: {}", table.iter().filter(|row| row.active).count());
    for row in &table {
        println!(
            "{:>3} {:<16} {:?}({}) valid={} disabled={} broken={} active={} coords={} wakes={}",
            row.index,
            row.name,
            row.link_type,
            row.tag,
            row.valid,
            row.disabled,
            row.broken,
            row.active,
            row.coords,
            row.wakes,
        );
    }
    Ok(())
}

fn main() -> ExitCode {
    init_tracing();
    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("assemble") if args.len() >= 3 => {
            let parsed = match parse_assemble_args(&args[2..]) {
                Ok(parsed) => parsed,
                Err(err) => {
                    eprintln!("argument error: {err}");
                    usage();
                    return ExitCode::from(2);
                }
            };
            match assemble_file(&parsed) {
                Ok(()) => ExitCode::SUCCESS,
                Err(err) => {
                    eprintln!("assemble_error: {err}");
                    ExitCode::from(1)
                }
            }
        }
        Some("inspect") if args.len() == 3 => match inspect_file(Path::new(&args[2])) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                eprintln!("inspect_error: {err}");
                ExitCode::from(1)
            }
        },
        _ => {
            usage();
            ExitCode::from(2)
        }
    }
}
