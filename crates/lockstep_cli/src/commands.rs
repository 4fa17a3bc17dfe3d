//! Subcommand implementations.

use crate::report;
use crate::{GenerateArgs, InspectArgs, VerifyArgs};
use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use lockstep_core::{CoreError, Timestamp, raw_to_dollars};
use lockstep_sim::{GenerationRun, SimError, SimSeed, SyntheticConfig, SyntheticGenerator, TabularAdapter};
use lockstep_verify::{CompareConfig, PolicyTable, Trace, TraceComparator, VerifyError};
use lockstep_wire::{AddOrderReader, WireError};
use std::fs::File;
use std::io::{BufReader, Write};
use std::process::ExitCode;

/// How a command ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Work done, verification passed
    Success,
    /// Mismatches found or nothing to compare
    Failure,
    /// Missing or malformed input
    InputError,
}

impl From<Status> for ExitCode {
    fn from(status: Status) -> Self {
        match status {
            Status::Success => ExitCode::SUCCESS,
            Status::Failure => ExitCode::from(1),
            Status::InputError => ExitCode::from(2),
        }
    }
}

/// Whether an error came from unusable input or output paths rather than a
/// bug; these exit with 2 so they never read as a verification failure
pub fn is_input_error(err: &color_eyre::Report) -> bool {
    err.chain().any(|cause| {
        cause.is::<SimError>()
            || cause.is::<VerifyError>()
            || cause.is::<WireError>()
            || cause.is::<CoreError>()
            || cause.is::<std::io::Error>()
            || cause.is::<serde_json::Error>()
    })
}

fn progress(len: Option<u64>) -> ProgressBar {
    match len {
        Some(len) => {
            let bar = ProgressBar::new(len);
            if let Ok(template) = ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} orders") {
                bar.set_style(template);
            }
            bar
        }
        None => {
            let bar = ProgressBar::new_spinner();
            bar.set_message("converting rows");
            bar
        }
    }
}

/// Write a stimulus stream from a synthetic or historical source
pub fn generate(args: &GenerateArgs, out: &mut dyn Write) -> Result<Status> {
    let seed = SimSeed::from_arg(&args.seed);
    let mut run = GenerationRun::new(&args.output);
    if let Some(log) = &args.csv {
        run = run.with_order_log(log);
    }

    let summary = match &args.input {
        Some(input) => {
            let adapter = TabularAdapter::from_path(input, &seed)?;
            let bar = progress(None);
            let summary = run.execute(bar.wrap_iter(adapter));
            bar.finish_and_clear();
            summary?
        }
        None => {
            let mut config = SyntheticConfig::new(args.num_orders)
                .with_base_price(args.base_price)
                .with_volatility(args.volatility)
                .with_seed(seed);
            if !args.symbols.is_empty() {
                config = config.with_symbols(args.symbols.iter().map(|s| s.trim().to_ascii_uppercase()).collect());
            }
            let generator = SyntheticGenerator::new(config)?;
            let bar = progress(Some(args.num_orders));
            let summary = run.execute(bar.wrap_iter(generator));
            bar.finish_and_clear();
            summary?
        }
    };

    writeln!(
        out,
        "Wrote {} Add Order messages ({} bytes) to {}",
        summary.stream.records,
        summary.stream.bytes,
        args.output.display()
    )?;
    writeln!(out, "BLAKE3: {}", summary.stream.digest)?;
    if let Some(log) = &args.csv {
        writeln!(out, "Order log: {} ({} rows)", log.display(), summary.logged)?;
    }
    Ok(Status::Success)
}

/// Compare traces and print the report
pub fn verify(args: &VerifyArgs, out: &mut dyn Write) -> Result<Status> {
    let config = CompareConfig::default().with_tolerance(args.tolerance);
    let mut comparator = TraceComparator::new(config)?;
    if let Some(path) = &args.policy {
        comparator = comparator.with_policy(PolicyTable::from_path(path)?);
    }

    if args.self_test {
        return self_test(args, &comparator, out);
    }

    let golden = Trace::load(&args.golden)?;
    let hardware = Trace::load(&args.hardware)?;
    let verdict = comparator.compare_traces(&golden, &hardware);

    let mut text = String::new();
    report::render(&mut text, &verdict, &args.golden, &args.hardware)?;
    write!(out, "{}", text)?;
    if let Some(path) = &args.verdict_json {
        let file = File::create(path).map_err(|e| CoreError::from_io(path, &e))?;
        serde_json::to_writer_pretty(file, &verdict)
            .wrap_err_with(|| format!("writing {}", path.display()))?;
    }

    Ok(if verdict.is_pass() {
        Status::Success
    } else {
        Status::Failure
    })
}

fn self_test(args: &VerifyArgs, comparator: &TraceComparator, out: &mut dyn Write) -> Result<Status> {
    writeln!(
        out,
        "{}",
        style("Running self-test (comparing golden trace against itself)...").cyan()
    )?;

    let golden = match Trace::load(&args.golden) {
        Ok(trace) => trace,
        Err(err) if err.is_input_not_found() => {
            writeln!(
                out,
                "{}",
                style(format!("Self-test skipped: {} not found", args.golden.display())).yellow()
            )?;
            return Ok(Status::Success);
        }
        Err(err) => return Err(err.into()),
    };

    let verdict = comparator.compare_traces(&golden, &golden);
    if verdict.is_pass() {
        writeln!(
            out,
            "{}",
            style(format!(
                "Self-test PASSED: {} orders verified against themselves",
                verdict.total
            ))
            .green()
        )?;
        Ok(Status::Success)
    } else {
        writeln!(out, "{}", style("Self-test FAILED: trace doesn't match itself!").red())?;
        Ok(Status::Failure)
    }
}

/// Decode a binary stream and print one line per record
pub fn inspect(args: &InspectArgs, out: &mut dyn Write) -> Result<Status> {
    let file = File::open(&args.input).map_err(|e| CoreError::from_io(&args.input, &e))?;
    let mut reader = AddOrderReader::new(BufReader::new(file));
    let limit = args.limit.unwrap_or(usize::MAX);

    writeln!(
        out,
        "{:>6}  {:<18}  {:>10}  {:<4}  {:>8}  {:<8}  {:>12}",
        "#", "time", "order_ref", "side", "shares", "symbol", "price"
    )?;

    let mut count = 0usize;
    while count < limit {
        let Some(record) = reader.next_record()? else {
            break;
        };
        let message = record.decode()?;
        let event = &message.event;
        let time = Timestamp::from_nanos(event.timestamp_ns)?;
        writeln!(
            out,
            "{:>6}  {:<18}  {:>10}  {:<4}  {:>8}  {:<8}  {:>12.4}",
            count,
            time.to_string(),
            event.order_ref,
            event.side.to_string(),
            event.shares,
            event.symbol,
            raw_to_dollars(event.price_raw)
        )?;
        if args.hex {
            writeln!(out, "        {}", record.to_hex())?;
        }
        count += 1;
    }

    writeln!(out, "{} records", count)?;
    tracing::debug!(path = %args.input.display(), count, "inspection finished");
    Ok(Status::Success)
}
