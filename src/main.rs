use std::io::{self, Write};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;

use eddy::classifiers::Classifier;
use eddy::classifiers::lazy::Knn;
use eddy::evaluation::{
    BasicClassificationEvaluator, BasicEstimator, BasicRegressionEvaluator, PerformanceEvaluator,
    Snapshot,
};
use eddy::tasks::PrequentialEvaluator;
use eddy::ui::cli::{Cli, Command};

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const FG_CYAN: &str = "\x1b[36m";
const FG_GREEN: &str = "\x1b[32m";
const FG_MAGENTA: &str = "\x1b[35m";
const FG_GREY: &str = "\x1b[90m";

fn main() -> Result<()> {
    let cli = Cli::parse();
    let Command::Run(args) = cli.command;

    let stream = args.build_stream().context("failed to build stream")?;

    let params = args.knn_params();
    let learner = Knn::with_params(params).context("invalid k-NN configuration")?;
    // Schema-dependent knobs fail here, before the run starts.
    learner
        .params()
        .validate_for(stream.header())
        .context("configuration incompatible with the stream schema")?;

    let nominal = stream.header().is_class_nominal();
    let evaluator: Box<dyn PerformanceEvaluator> = if nominal {
        Box::new(BasicClassificationEvaluator::<BasicEstimator>::new_with_flags(
            stream.header().number_of_classes(),
            true,
        ))
    } else {
        Box::new(BasicRegressionEvaluator::new())
    };

    let header_lines = vec![
        format!("{BOLD}{FG_CYAN}▶ Prequential k-NN Evaluation{RESET}"),
        format!(
            "{DIM}stream={}{RESET}  {DIM}k={} window={} search={}{RESET}  {}",
            stream.header().relation_name(),
            args.k,
            args.window_size,
            args.search,
            timestamp_now()
        ),
        format!(
            "{FG_GREY}────────────────────────────────────────────────────────────────────────{RESET}"
        ),
    ];

    let (tx, rx) = std::sync::mpsc::channel();
    let max_instances = args.max_instances;
    let max_seconds = args.max_seconds;
    let render = std::thread::spawn(move || {
        render_status_with_header(rx, header_lines, 150, max_instances, max_seconds)
    });

    let mut runner = PrequentialEvaluator::new(
        Box::new(learner) as Box<dyn Classifier>,
        stream,
        evaluator,
        args.max_instances,
        args.max_seconds,
        args.sample_frequency,
        args.mem_check_frequency,
    )
    .context("failed to construct PrequentialEvaluator")?
    .with_progress(tx);

    runner.run().context("runner failed")?;

    if let Some(path) = &args.dump_file
        && !path.as_os_str().is_empty()
    {
        runner
            .curve()
            .export(path, args.dump_format)
            .with_context(|| format!("failed to export snapshots to {}", path.display()))?;
    }

    drop(runner);
    let _ = render.join();

    Ok(())
}

/// Print the header once, then keep refreshing a single status line.
fn render_status_with_header(
    rx: Receiver<Snapshot>,
    header_lines: Vec<String>,
    repaint_every_ms: u64,
    max_instances: Option<u64>,
    max_seconds: Option<u64>,
) {
    for line in &header_lines {
        println!("{line}");
    }
    println!();
    let _ = io::stdout().flush();

    let tick = Duration::from_millis(repaint_every_ms);
    let mut last_draw = Instant::now();
    let mut last_snap: Option<Snapshot> = None;

    loop {
        match rx.recv_timeout(tick) {
            Ok(s) => last_snap = Some(s),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                if let Some(s) = last_snap.take() {
                    print!(
                        "\r{}\x1B[K\n",
                        format_status(&s, max_instances, max_seconds)
                    );
                    let _ = io::stdout().flush();
                }
                break;
            }
        }

        if last_draw.elapsed() >= tick {
            if let Some(s) = last_snap.as_ref() {
                print!("\r{}\x1B[K", format_status(s, max_instances, max_seconds));
                let _ = io::stdout().flush();
            }
            last_draw = Instant::now();
        }
    }
}

fn format_status(s: &Snapshot, max_instances: Option<u64>, max_seconds: Option<u64>) -> String {
    let mut line = format!(
        "{FG_GREEN}{BOLD}seen{RESET} {:>9}  \
         {FG_CYAN}{BOLD}acc{RESET} {:>7}% \
         {FG_MAGENTA}{BOLD}κ{RESET} {:>7}%",
        s.instances_seen,
        fmtf(s.accuracy * 100.0),
        fmtf(s.kappa * 100.0),
    );

    for key in ["mae", "rmse", "precision", "recall", "f1"] {
        if let Some(v) = s.extras.get(key) {
            line.push_str(&format!("  {DIM}{key}{RESET} {}", fmtf(*v)));
        }
    }

    line.push_str(&format!(
        "  {DIM}ram_h{RESET} {:>8.3e}  {DIM}t{RESET} {:>7.3}s",
        s.ram_hours, s.seconds
    ));

    let bar_width = 15usize;
    if let Some(mi) = max_instances {
        let bar = progress_bar(s.instances_seen as f64, mi as f64, bar_width);
        line.push_str(&format!("  {DIM}[inst]{RESET} {bar}"));
    }
    if let Some(ms) = max_seconds {
        let bar = progress_bar(s.seconds, ms as f64, bar_width);
        line.push_str(&format!("  {DIM}[time]{RESET} {bar}"));
    }

    line
}

fn progress_bar(current: f64, total: f64, width: usize) -> String {
    if total.is_finite() && total > 0.0 {
        let ratio = (current / total).clamp(0.0, 1.0);
        let filled = (ratio * width as f64).round() as usize;
        let empty = width.saturating_sub(filled);
        return format!(
            "[{}{}] {:>3.0}%",
            "█".repeat(filled),
            "░".repeat(empty),
            ratio * 100.0
        );
    }
    String::new()
}

fn fmtf(x: f64) -> String {
    if x.is_nan() {
        format!("{DIM}NaN{RESET}")
    } else {
        format!("{:>6.3}", x)
    }
}

fn timestamp_now() -> String {
    use chrono::{Local, SecondsFormat};
    let now = Local::now();
    format!(
        "{DIM}{}{}",
        now.to_rfc3339_opts(SecondsFormat::Secs, true),
        RESET
    )
}
