use std::env;

use crate::data::config::resolve_settings;
use crate::data::dataset::{load_dataset, Dataset};
use crate::data::validate::{validate_dataset, ValidationSeverity};
use crate::parallel::{draw_counts, run_sweep, WorkerPool};
use crate::report::{
    export_run, frequency_rows, render_frequency_tsv, render_trace_tsv, SimulationReport,
};
use crate::server::{self, api::ApiContext};

pub const USAGE: &str = "usage: mcforecast <serve|table|simulate|sweep|validate|export> [--dataset PATH] [--table]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Serve,
    Table,
    Simulate,
    Sweep,
    Validate,
    Export,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("serve") => Some(Command::Serve),
        Some("table") => Some(Command::Table),
        Some("simulate") => Some(Command::Simulate),
        Some("sweep") => Some(Command::Sweep),
        Some("validate") => Some(Command::Validate),
        Some("export") => Some(Command::Export),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    match parse_command(args) {
        Some(Command::Serve) => handle_serve(args),
        Some(Command::Table) => handle_table(args),
        Some(Command::Simulate) => handle_simulate(args),
        Some(Command::Sweep) => handle_sweep(args),
        Some(Command::Validate) => handle_validate(args),
        Some(Command::Export) => handle_export(args),
        None => {
            eprintln!("{USAGE}");
            2
        }
    }
}

/// Value following `--dataset`, if any.
fn dataset_arg(args: &[String]) -> Option<&str> {
    args.iter()
        .position(|arg| arg == "--dataset")
        .and_then(|index| args.get(index + 1))
        .map(String::as_str)
}

/// Arguments after the command word, skipping flags and the `--dataset` value.
fn positional_args(args: &[String]) -> Vec<&str> {
    let mut out = Vec::new();
    let mut iter = args.iter().skip(2);
    while let Some(arg) = iter.next() {
        if arg == "--dataset" {
            iter.next();
        } else if !arg.starts_with("--") {
            out.push(arg.as_str());
        }
    }
    out
}

fn as_table(args: &[String]) -> bool {
    args.iter().any(|arg| arg == "--table")
}

/// Dataset from `--dataset` or the built-in sample, combined with resolved settings.
fn load_context(args: &[String]) -> Result<ApiContext, String> {
    let settings = resolve_settings().map_err(|err| err.to_string())?;
    let dataset = match dataset_arg(args) {
        Some(path) => load_dataset(path).map_err(|err| format!("{path}: {err}"))?,
        None => Dataset::sample(),
    };
    ApiContext::new(dataset, settings).map_err(|err| err.to_string())
}

fn parse_draws(raw: Option<&str>, default: u32) -> Result<u32, String> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .parse::<u32>()
            .map_err(|_| format!("invalid draw count '{value}'")),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize output: {err}");
            1
        }
    }
}

fn handle_serve(args: &[String]) -> i32 {
    let ctx = match load_context(args) {
        Ok(ctx) => ctx,
        Err(err) => {
            eprintln!("server error: {err}");
            return 1;
        }
    };
    let bind_addr = env::var(server::BIND_ENV).unwrap_or_else(|_| server::DEFAULT_BIND_ADDR.to_string());
    match server::run_server(&bind_addr, &ctx) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("server error: {err}");
            1
        }
    }
}

fn handle_table(args: &[String]) -> i32 {
    let ctx = match load_context(args) {
        Ok(ctx) => ctx,
        Err(err) => {
            eprintln!("table failed: {err}");
            return 1;
        }
    };
    let rows = frequency_rows(&ctx.engine);
    if as_table(args) {
        print!("{}", render_frequency_tsv(&rows));
        0
    } else {
        print_json(&rows)
    }
}

fn handle_simulate(args: &[String]) -> i32 {
    let ctx = match load_context(args) {
        Ok(ctx) => ctx,
        Err(err) => {
            eprintln!("simulate failed: {err}");
            return 1;
        }
    };
    let positional = positional_args(args);
    let draws = match parse_draws(positional.first().copied(), ctx.settings.default_draws) {
        Ok(draws) => draws,
        Err(err) => {
            eprintln!("{err}");
            return 2;
        }
    };

    let run = match ctx.engine.run(draws) {
        Ok(run) => run,
        Err(err) => {
            tracing::error!(draws, %err, kind = ?err.kind(), "simulation failed");
            eprintln!("simulate failed: {err}");
            return 1;
        }
    };

    if as_table(args) {
        print!("{}", render_trace_tsv(&run.steps));
        println!(
            "prediction\t{}\t{}",
            run.prediction.category, run.prediction.count
        );
        0
    } else {
        print_json(&SimulationReport::new(&ctx.dataset.name, &ctx.engine, run))
    }
}

fn handle_sweep(args: &[String]) -> i32 {
    let ctx = match load_context(args) {
        Ok(ctx) => ctx,
        Err(err) => {
            eprintln!("sweep failed: {err}");
            return 1;
        }
    };
    let draws = draw_counts(ctx.settings.draws);
    match run_sweep(&ctx.engine, &draws, &WorkerPool::default()) {
        Ok(entries) if as_table(args) => {
            println!("draws\tcategory\tcount");
            for entry in entries {
                println!(
                    "{}\t{}\t{}",
                    entry.draws, entry.prediction.category, entry.prediction.count
                );
            }
            0
        }
        Ok(entries) => print_json(&entries),
        Err(err) => {
            eprintln!("sweep failed: {err}");
            1
        }
    }
}

fn handle_validate(args: &[String]) -> i32 {
    let Some(path) = positional_args(args).first().copied() else {
        eprintln!("usage: mcforecast validate <path-to-dataset>");
        return 2;
    };

    let dataset = match load_dataset(path) {
        Ok(dataset) => dataset,
        Err(err) => {
            eprintln!("validation failed: {err}");
            return 1;
        }
    };

    let report = validate_dataset(&dataset);
    for diag in &report.diagnostics {
        if diag.severity == ValidationSeverity::Info {
            println!("- {diag}");
        } else {
            eprintln!("- {diag}");
        }
    }
    if report.has_errors() {
        eprintln!(
            "validation failed: {} issue(s)",
            report.count(ValidationSeverity::Error)
        );
        1
    } else {
        println!("validation passed: {path}");
        0
    }
}

fn handle_export(args: &[String]) -> i32 {
    let positional = positional_args(args);
    let (Some(raw_draws), Some(out_dir)) = (positional.first().copied(), positional.get(1).copied())
    else {
        eprintln!("usage: mcforecast export <draws> <out-dir> [--dataset PATH]");
        return 2;
    };
    let draws = match parse_draws(Some(raw_draws), 0) {
        Ok(draws) => draws,
        Err(err) => {
            eprintln!("{err}");
            return 2;
        }
    };

    let ctx = match load_context(args) {
        Ok(ctx) => ctx,
        Err(err) => {
            eprintln!("export failed: {err}");
            return 1;
        }
    };
    let run = match ctx.engine.run(draws) {
        Ok(run) => run,
        Err(err) => {
            eprintln!("export failed: {err}");
            return 1;
        }
    };

    match export_run(out_dir, &frequency_rows(&ctx.engine), &run.steps) {
        Ok(report) => {
            println!(
                "export complete: frequency='{}', trace='{}', steps={}",
                report.frequency_path.display(),
                report.trace_path.display(),
                report.steps
            );
            0
        }
        Err(err) => {
            eprintln!("export failed: {err}");
            1
        }
    }
}
