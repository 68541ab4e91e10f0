use clap::Parser;

/// Arguments for completions command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Generate bash completions:\n    devsync completions bash > ~/.bash_completion.d/devsync\n\n\
                  Generate zsh completions:\n    devsync completions zsh > ~/.zfunc/_devsync\n\n\
                  Generate fish completions:\n    devsync completions fish > ~/.config/fish/completions/devsync.fish")]
pub struct CompletionsArgs {
    /// Shell type (bash, elvish, fish, powershell, zsh)
    pub shell: String,
}
