use std::path::PathBuf;

use envconfig::Envconfig;

#[derive(Envconfig, Clone, Debug)]
pub struct Config {
    #[envconfig(from = "NETLOG_DECODE_OUTPUT_DIR", default = ".")]
    pub output_dir: PathBuf,
    /// Overwrite existing output files without asking.
    #[envconfig(from = "NETLOG_DECODE_ASSUME_YES", default = "false")]
    pub assume_yes: bool,
    #[envconfig(from = "NETLOG_DECODE_PARALLEL", default = "false")]
    pub parallel: bool,
}
