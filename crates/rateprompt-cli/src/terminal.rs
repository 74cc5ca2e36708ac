//! Host primitives for a terminal: alerts on stderr, answers from stdin.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use rateprompt_core::{
    Alert, AlertPresenter, ButtonStyle, PlatformError, PresentationError, UrlOpener,
};

/// Prints alerts to stderr and reads the 1-based button number from stdin,
/// unless a pre-scripted answer is queued.
#[derive(Debug, Default)]
pub struct TerminalPresenter {
    answers: Mutex<VecDeque<usize>>,
}

impl TerminalPresenter {
    pub fn with_answers(answers: impl IntoIterator<Item = usize>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
        }
    }

    fn next_scripted(&self) -> Option<usize> {
        self.answers.lock().ok()?.pop_front()
    }
}

async fn read_stdin_line() -> Result<String, PresentationError> {
    tokio::task::spawn_blocking(|| {
        let mut line = String::new();
        std::io::stdin().read_line(&mut line).map(|_| line)
    })
    .await
    .map_err(|e| PresentationError::Failed(e.to_string()))?
    .map_err(|e| PresentationError::Failed(e.to_string()))
}

#[async_trait]
impl AlertPresenter for TerminalPresenter {
    async fn present_choice(&self, alert: &Alert) -> Result<usize, PresentationError> {
        eprintln!();
        eprintln!("{}", alert.title);
        eprintln!("{}", alert.message);
        for (i, button) in alert.buttons.iter().enumerate() {
            let marker = match button.style {
                ButtonStyle::Cancel => " (cancel)",
                ButtonStyle::Default => "",
            };
            eprintln!("  [{}] {}{}", i + 1, button.label, marker);
        }

        let number = match self.next_scripted() {
            Some(n) => {
                eprintln!("> {n}");
                n
            }
            None => {
                let line = read_stdin_line().await?;
                if line.is_empty() {
                    return Err(PresentationError::Failed("no answer on stdin".into()));
                }
                let answer = line.trim();
                answer.parse::<usize>().map_err(|_| {
                    PresentationError::Failed(format!("not a button number: {answer}"))
                })?
            }
        };

        number
            .checked_sub(1)
            .filter(|i| *i < alert.buttons.len())
            .ok_or(PresentationError::InvalidChoice {
                index: number,
                buttons: alert.buttons.len(),
            })
    }
}

/// Opens URLs with the system handler.
#[derive(Debug, Default)]
pub struct SystemOpener;

#[async_trait]
impl UrlOpener for SystemOpener {
    async fn open_url(&self, url: &str) -> Result<(), PlatformError> {
        let target = url.to_string();
        tokio::task::spawn_blocking(move || open::that(target))
            .await
            .map_err(|e| e.to_string())
            .and_then(|r| r.map_err(|e| e.to_string()))
            .map_err(|message| PlatformError::OpenUrlFailed {
                url: url.to_string(),
                message,
            })
    }
}

/// Prints URLs instead of opening them.
#[derive(Debug, Default)]
pub struct PrintOpener;

#[async_trait]
impl UrlOpener for PrintOpener {
    async fn open_url(&self, url: &str) -> Result<(), PlatformError> {
        println!("open {url}");
        Ok(())
    }
}
