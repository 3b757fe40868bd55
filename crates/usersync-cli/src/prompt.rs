use dialoguer::Confirm;
use std::io::IsTerminal;

pub fn is_interactive_terminal() -> bool {
    std::io::stdin().is_terminal() && std::io::stdout().is_terminal()
}

/// Ask a yes/no question, defaulting to no.
///
/// Fails without a terminal rather than guessing an answer.
pub fn confirm(prompt: &str) -> anyhow::Result<bool> {
    if !is_interactive_terminal() {
        anyhow::bail!(
            "confirmation requires an interactive terminal\n\
             Pass --ask-for-confirmation false for scripted runs"
        );
    }
    let answer = Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?;
    Ok(answer)
}
