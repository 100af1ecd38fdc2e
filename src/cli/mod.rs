use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = r###"Streams host CPU, memory, GPU, disk and network load to a serial display"###)]
pub struct CmdArgs {
    /// Path to the configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Serial port to use instead of asking, e.g. COM3 or /dev/ttyUSB0.
    #[arg(short, long)]
    pub port: Option<String>,
}
