use anyhow::Context;
use inquire::{InquireError, Select, Text};
use weather_core::{Action, NavKey};

use crate::cli::App;

/// Prompt loop: type a location, then pick from the dropdown or search the text
/// as typed. Empty input or Esc quits.
pub async fn run(app: &mut App) -> anyhow::Result<()> {
    loop {
        app.flush_timers().await;
        println!("\n{}", app.screen());

        let prompt = Text::new("Location:").with_help_message("empty to quit");
        let query = match prompt.prompt() {
            Ok(query) => query,
            Err(InquireError::OperationCanceled) => break,
            Err(InquireError::OperationInterrupted) => break,
            Err(err) => return Err(err).context("Failed to read location"),
        };
        if query.trim().is_empty() {
            break;
        }

        app.dispatch(Action::TextChanged(query.clone())).await;

        if !app.state().dropdown_open() {
            app.dispatch(Action::Key(NavKey::Enter)).await;
            continue;
        }

        let mut options: Vec<String> = app
            .state()
            .suggestions()
            .iter()
            .map(|s| s.display_name.clone())
            .collect();
        let count = options.len();
        options.push(format!("Search \"{}\"", query.trim()));

        match Select::new("Did you mean:", options).raw_prompt() {
            Ok(choice) if choice.index < count => pick(app, choice.index).await,
            Ok(_) => {
                app.dispatch(Action::Key(NavKey::Escape)).await;
                app.dispatch(Action::Key(NavKey::Enter)).await;
            }
            Err(InquireError::OperationCanceled) => {
                app.dispatch(Action::Key(NavKey::Escape)).await;
            }
            Err(InquireError::OperationInterrupted) => break,
            Err(err) => return Err(err).context("Failed to read selection"),
        }
    }

    Ok(())
}

/// A pick from the list takes focus away from the text box first; the choice
/// lands while the blur timer is still running.
async fn pick(app: &mut App, index: usize) {
    let Some(chosen) = app.state().suggestions().get(index).cloned() else {
        return;
    };
    app.dispatch(Action::Blur).await;
    app.dispatch(Action::SuggestionChosen(chosen)).await;
}
