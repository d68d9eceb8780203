use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "runbsa")]
#[command(version)]
#[command(about = "A Rust unpacker for BSA game archives", long_about = None)]
#[command(after_help = "Examples:\n  \
  runbsa Meshes.bsa -x textures         extract everything except textures\n  \
  runbsa -p Misc.bsa 'menus\\*.xml'      send matching entries to stdout\n  \
  runbsa -v --size-prefix Meshes.bsa    list entries with sizes and hashes\n  \
  runbsa --hash 'meshes\\x.nif'          print the archive hash of a path")]
pub struct Cli {
    /// BSA archive path
    #[arg(value_name = "FILE", required_unless_present = "hash")]
    pub file: Option<String>,

    /// Entries to extract (default: all)
    #[arg(value_name = "NAMES")]
    pub files: Vec<String>,

    /// List entries (short format)
    #[arg(short = 'l')]
    pub list: bool,

    /// List verbosely
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Extract entries to pipe, no messages
    #[arg(short = 'p')]
    pub pipe: bool,

    /// Extract entries into exdir
    #[arg(short = 'd', value_name = "DIR")]
    pub extract_dir: Option<String>,

    /// Exclude entries that follow
    #[arg(short = 'x', value_name = "NAME", num_args = 1..)]
    pub exclude: Vec<String>,

    /// Never overwrite existing files
    #[arg(short = 'n')]
    pub never_overwrite: bool,

    /// Overwrite files WITHOUT prompting
    #[arg(short = 'o')]
    pub overwrite: bool,

    /// Junk paths (do not make directories)
    #[arg(short = 'j')]
    pub junk_paths: bool,

    /// Quiet mode (-qq => quieter)
    #[arg(short = 'q', action = clap::ArgAction::Count)]
    pub quiet: u8,

    /// Compressed entries carry a 4-byte original size before the zlib data
    #[arg(long = "size-prefix")]
    pub size_prefix: bool,

    /// Print the archive hash of each PATH and exit
    #[arg(long = "hash", value_name = "PATH", num_args = 1..)]
    pub hash: Vec<String>,

    /// Hash PATHs as folder names
    #[arg(long = "folder", requires = "hash")]
    pub folder: bool,
}

impl Cli {
    pub fn is_quiet(&self) -> bool {
        self.quiet > 0 || self.pipe
    }

    pub fn is_very_quiet(&self) -> bool {
        self.quiet > 1
    }

    /// Default log filter when `RUST_LOG` is unset
    pub fn log_level(&self) -> &'static str {
        if self.is_very_quiet() { "off" } else if self.quiet > 0 { "error" } else { "warn" }
    }
}
