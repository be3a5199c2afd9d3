//! Completion client seam

use crate::Result;

/// Text-in, text-out access to a language model
pub trait CompletionClient {
    /// Send a system prompt and a user prompt, returning the reply text
    fn complete(&self, system: &str, user: &str) -> Result<String>;

    /// Short label for log lines
    fn name(&self) -> &str {
        "completion client"
    }
}

impl<C: CompletionClient + ?Sized> CompletionClient for &C {
    fn complete(&self, system: &str, user: &str) -> Result<String> {
        (**self).complete(system, user)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<C: CompletionClient + ?Sized> CompletionClient for Box<C> {
    fn complete(&self, system: &str, user: &str) -> Result<String> {
        (**self).complete(system, user)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
