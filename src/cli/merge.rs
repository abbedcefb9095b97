// merge.rs - Merge configuration file with CLI arguments

use crate::cli::args::{DEFAULT_MIN_CF, DEFAULT_MIN_GF, DEFAULT_OUTDIR};
use crate::cli::{Args, Config};

impl Args {
    /// Merge with configuration from file.
    /// CLI arguments take precedence; a CLI value still equal to its default
    /// is overridden by the file.
    pub fn merge_with_config(mut self, config: Config) -> Self {
        // Input/Output
        if self.reference.is_none() {
            self.reference = config.reference;
        }
        if self.samples.is_empty() {
            if let Some(samples) = config.samples {
                self.samples = samples;
            }
        }
        if self.outdir == DEFAULT_OUTDIR {
            if let Some(outdir) = config.outdir {
                self.outdir = outdir;
            }
        }

        // Thresholds (only override defaults, not explicit CLI values)
        if self.min_gf == DEFAULT_MIN_GF {
            if let Some(min_gf) = config.min_gf {
                self.min_gf = min_gf;
            }
        }
        if self.min_cf == DEFAULT_MIN_CF {
            if let Some(min_cf) = config.min_cf {
                self.min_cf = min_cf;
            }
        }
        if self.min_pf == 0.0 {
            if let Some(min_pf) = config.min_pf {
                self.min_pf = min_pf;
            }
        }
        if self.min_pn == 0 {
            if let Some(min_pn) = config.min_pn {
                self.min_pn = min_pn;
            }
        }

        // Core settings
        if !self.progressive && config.progressive.unwrap_or(false) {
            self.progressive = true;
        }
        if self.ploidy.is_none() {
            self.ploidy = config.ploidy;
        }

        // Performance
        if self.chunk_size.is_none() {
            self.chunk_size = config.chunk_size;
        }
        if self.threads.is_none() {
            self.threads = config.threads;
        }

        // Flags
        if !self.dry_run && config.dry_run.unwrap_or(false) {
            self.dry_run = true;
        }
        if !self.quiet && config.quiet.unwrap_or(false) {
            self.quiet = true;
        }

        self
    }

    /// Load configuration and merge with CLI args
    pub fn with_config_file(self, config_path: &str) -> Result<Self, String> {
        let config = Config::from_file(config_path)?;
        Ok(self.merge_with_config(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_fills_defaults() {
        let config = Config {
            reference: Some("ref.fa".to_string()),
            samples: Some(vec!["a.fa".to_string()]),
            min_gf: Some(0.5),
            progressive: Some(true),
            ploidy: Some(3),
            ..Config::new()
        };
        let args = Args::defaults().merge_with_config(config);
        assert_eq!(args.reference.as_deref(), Some("ref.fa"));
        assert_eq!(args.samples, vec!["a.fa"]);
        assert_eq!(args.min_gf, 0.5);
        assert_eq!(args.min_cf, DEFAULT_MIN_CF);
        assert!(args.progressive);
        assert_eq!(args.ploidy, Some(3));
    }

    #[test]
    fn test_cli_values_win() {
        let config = Config {
            reference: Some("config_ref.fa".to_string()),
            samples: Some(vec!["config.fa".to_string()]),
            outdir: Some("config_out".to_string()),
            min_cf: Some(0.5),
            chunk_size: Some(10),
            ..Config::new()
        };
        let args = Args {
            reference: Some("cli_ref.fa".to_string()),
            samples: vec!["cli.fa".to_string()],
            outdir: "cli_out".to_string(),
            min_cf: 0.99,
            chunk_size: Some(2000),
            ..Args::defaults()
        };
        let args = args.merge_with_config(config);
        assert_eq!(args.reference.as_deref(), Some("cli_ref.fa"));
        assert_eq!(args.samples, vec!["cli.fa"]);
        assert_eq!(args.outdir, "cli_out");
        assert_eq!(args.min_cf, 0.99);
        assert_eq!(args.chunk_size, Some(2000));
    }
}
