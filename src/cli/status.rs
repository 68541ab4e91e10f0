use clap::Parser;

/// Arguments for status command
#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// Packages to show (defaults to all configured packages)
    pub packages: Vec<String>,

    /// Also ask npm whether each package is linked
    #[arg(long)]
    pub links: bool,
}
