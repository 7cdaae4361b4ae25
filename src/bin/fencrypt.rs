use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, bail};
use clap::Parser;
use clap::error::ErrorKind;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use encrypt_rs::cipher::ShiftCipher;
use encrypt_rs::common::io_error_msg;
use encrypt_rs::pipeline::{Pipeline, ResetHandle, Streams};
use encrypt_rs::sequencer::Signal;

#[derive(Parser)]
#[command(
    name = "fencrypt",
    version,
    about = "Encrypt a file one character at a time, logging character counts"
)]
struct Cli {
    /// File to encrypt
    input: PathBuf,

    /// Where the encrypted text is written
    output: PathBuf,

    /// Where the character counts are written
    log: PathBuf,

    /// Slots in the input buffer (prompted for if omitted)
    #[arg(long = "input-capacity", value_name = "N")]
    input_capacity: Option<usize>,

    /// Slots in the output buffer (prompted for if omitted)
    #[arg(long = "output-capacity", value_name = "M")]
    output_capacity: Option<usize>,

    /// Initial cipher key
    #[arg(long = "key", value_name = "K", default_value_t = 1)]
    key: u32,

    /// Re-key every MS milliseconds while encrypting
    #[arg(long = "reset-every", value_name = "MS")]
    reset_every: Option<u64>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    encrypt_rs::common::reset_sigpipe();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            let _ = e.print();
            process::exit(code);
        }
    };

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("fencrypt: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    // Fail on a bad path before asking anything.
    let Streams {
        mut source,
        mut sink,
        reporter,
    } = Streams::open(&cli.input, &cli.output, &cli.log)?;

    let stdin = io::stdin();
    let mut prompts = stdin.lock();
    let input_capacity = match cli.input_capacity {
        Some(n) => n,
        None => prompt_capacity(&mut prompts, "input")?,
    };
    let output_capacity = match cli.output_capacity {
        Some(m) => m,
        None => prompt_capacity(&mut prompts, "output")?,
    };
    drop(prompts);

    let pipeline = Pipeline::builder()
        .input_capacity(input_capacity)
        .output_capacity(output_capacity)
        .transform(ShiftCipher::new(cli.key))
        .reporter(reporter)
        .build()?;
    let handle = pipeline.reset_handle();
    let finished = Signal::new();

    let summary = thread::scope(|scope| {
        if let Some(ms) = cli.reset_every {
            let period = Duration::from_millis(ms.max(1));
            let key = ShiftCipher::new(cli.key).key();
            let (handle, finished) = (&handle, &finished);
            scope.spawn(move || rekey_periodically(handle, finished, period, key));
        }
        let summary = pipeline.run(&mut source, &mut sink);
        finished.raise();
        summary
    })?;

    println!("End of file reached.");
    info!(
        bytes = summary.admitted,
        resets = summary.resets,
        "done"
    );
    Ok(())
}

/// Ask for a buffer size until a positive integer is entered.
fn prompt_capacity(input: &mut impl BufRead, which: &str) -> anyhow::Result<usize> {
    let mut stdout = io::stdout();
    let mut line = String::new();
    loop {
        print!("Enter buffer size for the {}: ", which);
        stdout.flush().map_err(|e| anyhow!(io_error_msg(&e)))?;
        line.clear();
        let n = input
            .read_line(&mut line)
            .map_err(|e| anyhow!("cannot read buffer size: {}", io_error_msg(&e)))?;
        if n == 0 {
            bail!("no buffer size for the {} given", which);
        }
        match line.trim().parse::<usize>() {
            Ok(n) if n > 0 => return Ok(n),
            _ => println!("Invalid buffer, must be greater than 0"),
        }
    }
}

fn rekey_periodically(handle: &ResetHandle, finished: &Signal, period: Duration, mut key: u8) {
    while !finished.wait_until(Instant::now() + period) {
        println!("Reset requested.");
        key = ShiftCipher::next_key(key);
        match handle.rekey(ShiftCipher::new(key as u32)) {
            Ok(_) => println!("Reset finished."),
            Err(e) => warn!(error = %e, "re-key failed"),
        }
    }
}
