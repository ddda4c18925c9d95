// Blocking user dialogs: confirmation before destructive actions and alerts for
// outcomes the user must acknowledge.
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::io::{BufRead, Write};
use tokio::sync::oneshot;

#[async_trait]
pub trait Dialogs: Send + Sync {
    async fn confirm(&self, message: &str) -> bool;
    fn alert(&self, message: &str);
}

// Reads y/N answers from stdin, prints alerts to stdout
pub struct TerminalDialogs {
    assume_yes: bool,
}

impl TerminalDialogs {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

fn read_answer() -> bool {
    let mut answer = String::new();
    if std::io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

#[async_trait]
impl Dialogs for TerminalDialogs {
    async fn confirm(&self, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }

        {
            let mut stdout = std::io::stdout().lock();
            if write!(stdout, "{} [y/N] ", message)
                .and_then(|_| stdout.flush())
                .is_err()
            {
                return false;
            }
        }

        // Detached thread; an abandoned prompt must not hold up runtime shutdown
        let (tx, rx) = oneshot::channel();
        std::thread::spawn(move || {
            let _ = tx.send(read_answer());
        });
        rx.await.unwrap_or(false)
    }

    fn alert(&self, message: &str) {
        println!("{}", message);
    }
}

// Answers confirmations from a script and records everything shown
#[derive(Default)]
pub struct ScriptedDialogs {
    answers: Mutex<VecDeque<bool>>,
    confirmations: Mutex<Vec<String>>,
    alerts: Mutex<Vec<String>>,
}

impl ScriptedDialogs {
    // Once the script runs out every confirmation is declined
    pub fn answering(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            ..Default::default()
        }
    }

    pub fn confirmations(&self) -> Vec<String> {
        self.confirmations.lock().clone()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts.lock().clone()
    }
}

#[async_trait]
impl Dialogs for ScriptedDialogs {
    async fn confirm(&self, message: &str) -> bool {
        self.confirmations.lock().push(message.to_string());
        self.answers.lock().pop_front().unwrap_or(false)
    }

    fn alert(&self, message: &str) {
        self.alerts.lock().push(message.to_string());
    }
}
