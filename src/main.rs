// main.rs - CLI entry point

use polycore::cli::Config;
use polycore::prelude::*;
use polycore::reporter::{ConsoleReporter, SilentReporter};
use std::time::Instant;

fn main() {
    if let Err(e) = run_main() {
        eprintln!("❌ ERROR: {}", e);
        std::process::exit(1);
    }
}

fn run_main() -> Result<(), String> {
    let mut args: Args = argh::from_env();

    if args.version {
        println!("{}", polycore::get_info());
        return Ok(());
    }

    // Handle generate config first
    if args.generate_config {
        println!("{}", Config::generate_sample());
        println!("\n💡 Save this content to a .toml file and use --config /path/to/config.toml");
        return Ok(());
    }

    // Load configuration file if specified
    if let Some(config_path) = args.config.clone() {
        args = args.with_config_file(&config_path)?;
    }

    let reporter: Box<dyn Reporter> = if args.quiet {
        Box::new(SilentReporter)
    } else {
        Box::new(ConsoleReporter)
    };
    let reporter = reporter.as_ref();

    reporter.info(&format!("🚀 polycore v{}", polycore::VERSION));

    let validation = validate_args(&args)?;
    let params = &validation.params;

    // Configure thread pool
    if let Some(n) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
            .map_err(|e| format!("Failed to configure thread pool: {}", e))?;
        reporter.info(&format!("🧵 Threads: {}", n));
    } else {
        reporter.info(&format!(
            "🧵 Threads: {} (auto-detected)",
            rayon::current_num_threads()
        ));
    }

    match &validation.memory {
        Some(memory) => reporter.info(&format!(
            "🧠 Available memory {} -> chunk size {}",
            memory.describe(),
            params.chunk_size
        )),
        None => reporter.info(&format!("📏 Chunk size: {}", params.chunk_size)),
    }

    let total_start = Instant::now();
    let set = load_sequences(&validation.inputs, reporter)?;

    if args.dry_run {
        reporter.info("✅ Dry run completed successfully");
        reporter.info(&format!(
            "📊 {} sequences × {} sites, output directory: {}",
            set.len(),
            set.sequence_length(),
            validation.outdir.display()
        ));
        return Ok(());
    }

    let result = run_pipeline(&set.sequences, &set.names, params, reporter)?;
    write_outputs(&validation.outdir, &result, params, reporter)?;

    reporter.info(&format!(
        "🎉 Done in {:.1}s",
        total_start.elapsed().as_secs_f64()
    ));
    Ok(())
}
