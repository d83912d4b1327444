//! Print an example configuration file

use anyhow::Result;

pub fn run() -> Result<()> {
    print!("{}", tally_core::example_config());
    Ok(())
}
