// args.rs - Command line arguments definition

use argh::FromArgs;

pub const DEFAULT_MIN_GF: f64 = 0.9;
pub const DEFAULT_MIN_CF: f64 = 0.95;
pub const DEFAULT_OUTDIR: &str = ".";

#[derive(FromArgs, Debug)]
/// polycore - Core genome and ploidy-aware pairwise distances from aligned FASTA
pub struct Args {
    /// reference FASTA (named "Reference" in all outputs)
    #[argh(option, long = "ref")]
    pub reference: Option<String>,

    /// sample FASTA files aligned to the reference
    #[argh(positional)]
    pub samples: Vec<String>,

    /// minimum genome fraction per sample (0.0-1.0, default: 0.9)
    #[argh(option, default = "DEFAULT_MIN_GF")]
    pub min_gf: f64,

    /// minimum fraction of samples called for a core site (0.0-1.0, default: 0.95)
    #[argh(option, default = "DEFAULT_MIN_CF")]
    pub min_cf: f64,

    /// minimum fraction of informative samples with a non-reference base (0.0-1.0, default: 0.0)
    #[argh(option, default = "0.0")]
    pub min_pf: f64,

    /// minimum number of samples with a non-reference base (default: 0)
    #[argh(option, default = "0")]
    pub min_pn: usize,

    /// add samples one at a time by decreasing genome fraction and record the core trajectory
    #[argh(switch)]
    pub progressive: bool,

    /// ploidy (default: inferred from the largest ambiguity code seen)
    #[argh(option)]
    pub ploidy: Option<usize>,

    /// sites per distance chunk (default: derived from available memory)
    #[argh(option)]
    pub chunk_size: Option<usize>,

    /// number of threads (default: auto-detect)
    #[argh(option)]
    pub threads: Option<usize>,

    /// output directory (default: .)
    #[argh(option, default = "String::from(DEFAULT_OUTDIR)")]
    pub outdir: String,

    /// path to TOML configuration file
    #[argh(option)]
    pub config: Option<String>,

    /// generate sample configuration file and exit
    #[argh(switch)]
    pub generate_config: bool,

    /// validate inputs without computation (dry run)
    #[argh(switch)]
    pub dry_run: bool,

    /// only print errors
    #[argh(switch, short = 'q')]
    pub quiet: bool,

    /// print version and exit
    #[argh(switch)]
    pub version: bool,
}

#[cfg(test)]
impl Args {
    /// Arguments as they come out of argh with no flags given
    pub fn defaults() -> Self {
        Self {
            reference: None,
            samples: Vec::new(),
            min_gf: DEFAULT_MIN_GF,
            min_cf: DEFAULT_MIN_CF,
            min_pf: 0.0,
            min_pn: 0,
            progressive: false,
            ploidy: None,
            chunk_size: None,
            threads: None,
            outdir: DEFAULT_OUTDIR.to_string(),
            config: None,
            generate_config: false,
            dry_run: false,
            quiet: false,
            version: false,
        }
    }
}
