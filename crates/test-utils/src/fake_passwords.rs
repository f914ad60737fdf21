use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use vcsrun::cancel::CancellationToken;
use vcsrun::errors::{Result, VcsrunError};
use vcsrun::interactive::PasswordSource;

/// A password source that:
/// - hands out the scripted answers in order
/// - counts how many times it was asked
///
/// Asking more often than there are answers yields an error.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPasswords {
    answers: Arc<Mutex<Vec<String>>>,
    asked: Arc<Mutex<usize>>,
}

impl ScriptedPasswords {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut answers: Vec<String> = answers.into_iter().map(Into::into).collect();
        answers.reverse();
        Self {
            answers: Arc::new(Mutex::new(answers)),
            asked: Arc::new(Mutex::new(0)),
        }
    }

    pub fn times_asked(&self) -> usize {
        *self.asked.lock().unwrap()
    }
}

impl PasswordSource for ScriptedPasswords {
    fn read_masked_line<'a>(
        &'a mut self,
        _cancel: &'a CancellationToken,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        Box::pin(async move {
            *self.asked.lock().unwrap() += 1;
            let next = self.answers.lock().unwrap().pop();
            next.ok_or_else(|| anyhow::anyhow!("no scripted password left").into())
        })
    }
}

/// A password source that never answers; it only returns once cancelled.
///
/// Stands in for a user who walked away from the terminal.
#[derive(Debug, Clone, Default)]
pub struct BlockingPasswords {
    asked: Arc<Mutex<usize>>,
}

impl BlockingPasswords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn times_asked(&self) -> usize {
        *self.asked.lock().unwrap()
    }
}

impl PasswordSource for BlockingPasswords {
    fn read_masked_line<'a>(
        &'a mut self,
        cancel: &'a CancellationToken,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        Box::pin(async move {
            *self.asked.lock().unwrap() += 1;
            cancel.cancelled().await;
            Err(VcsrunError::Cancelled)
        })
    }
}
