// SPDX-License-Identifier: GPL-3.0-or-later
use structopt::StructOpt;

use std::path::PathBuf;

use crate::temperature::TemperatureUnit;

#[derive(Debug, Default, StructOpt)]
#[structopt(about = "Live thermal camera viewer")]
pub(crate) struct Args {
    /// Path to a configuration file.
    #[structopt(short, long, parse(from_os_str))]
    pub(crate) config_path: Option<PathBuf>,

    /// Index of the video capture device to use.
    #[structopt(short, long)]
    pub(crate) device: Option<u32>,

    /// Temperature unit to start with (celsius or fahrenheit).
    #[structopt(short, long)]
    pub(crate) units: Option<TemperatureUnit>,

    /// Display scale to start with.
    #[structopt(short, long)]
    pub(crate) scale: Option<u32>,

    /// Show no window, and read commands typed on stdin instead.
    #[structopt(long)]
    pub(crate) headless: bool,
}
