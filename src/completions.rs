use std::io;

use clap::CommandFactory;
use clap_complete::Shell;

use crate::cli::Cli;

pub fn generate(shell: Shell) {
    let mut command = Cli::command();
    clap_complete::generate(shell, &mut command, "sprig", &mut io::stdout());
}
