use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;

pub fn create_spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["-", "\\", "|", "/"])
            .template("{msg} {spinner}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner
}

/// Run `future` behind a spinner, clearing it once the future resolves.
pub async fn spin<F: Future>(message: &str, future: F) -> F::Output {
    let spinner = create_spinner(message.to_string());
    let output = future.await;
    spinner.finish_and_clear();
    output
}
