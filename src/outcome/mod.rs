use std::sync::Arc;

use crate::error::Error;

/// The tracked result of mapping one input to one output.
///
/// An outcome is a success exactly when it carries an output. Failure
/// messages and causes accumulate as an outcome moves through composed
/// stages; they are never overwritten, so the full history of what went
/// wrong stays attached to the item.
#[derive(Debug, Clone)]
pub struct Outcome<I, O> {
    input: I,
    output: Option<O>,
    messages: Vec<String>,
    causes: Vec<Arc<Error>>,
}

impl<I, O> Outcome<I, O> {
    pub fn success(input: I, output: O) -> Self {
        Self {
            input,
            output: Some(output),
            messages: Vec::new(),
            causes: Vec::new(),
        }
    }

    pub fn failure(input: I, cause: Error) -> Self {
        let message = cause.to_string();
        Self {
            input,
            output: None,
            messages: vec![message],
            causes: vec![Arc::new(cause)],
        }
    }

    pub fn failure_msg(input: I, message: impl Into<String>) -> Self {
        Self {
            input,
            output: None,
            messages: vec![message.into()],
            causes: Vec::new(),
        }
    }

    pub fn failure_with(input: I, message: impl Into<String>, cause: Error) -> Self {
        Self {
            input,
            output: None,
            messages: vec![message.into()],
            causes: vec![Arc::new(cause)],
        }
    }

    pub(crate) fn from_parts(
        input: I,
        output: Option<O>,
        messages: Vec<String>,
        causes: Vec<Arc<Error>>,
    ) -> Self {
        Self {
            input,
            output,
            messages,
            causes,
        }
    }

    pub fn is_success(&self) -> bool {
        self.output.is_some()
    }

    pub fn is_failure(&self) -> bool {
        self.output.is_none()
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    pub fn output(&self) -> Option<&O> {
        self.output.as_ref()
    }

    pub fn into_output(self) -> Option<O> {
        self.output
    }

    /// Every message recorded against this item, oldest first.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn causes(&self) -> &[Arc<Error>] {
        &self.causes
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.messages.push(message.into());
        self
    }

    /// Apply `f` to the output of a successful outcome.
    ///
    /// An error from `f` turns the outcome into a failure with the input
    /// preserved and one more message appended. A failed outcome passes
    /// through untouched, keeping everything it has accumulated.
    pub fn map<P>(self, f: impl FnOnce(O) -> crate::error::Result<P>) -> Outcome<I, P> {
        let (input, output, mut messages, mut causes) = self.into_parts();
        match output {
            None => Outcome::from_parts(input, None, messages, causes),
            Some(value) => match f(value) {
                Ok(mapped) => Outcome::from_parts(input, Some(mapped), messages, causes),
                Err(err) => {
                    messages.push(err.to_string());
                    causes.push(Arc::new(err));
                    Outcome::from_parts(input, None, messages, causes)
                }
            },
        }
    }

    /// Carry a failed outcome into the next stage's output type.
    ///
    /// Only meaningful for failures; the output of a successful outcome
    /// cannot cross a stage boundary this way.
    pub fn propagate<P>(self) -> Outcome<I, P> {
        debug_assert!(self.is_failure(), "propagate called on a success");
        Outcome::from_parts(self.input, None, self.messages, self.causes)
    }

    pub(crate) fn into_parts(self) -> (I, Option<O>, Vec<String>, Vec<Arc<Error>>) {
        (self.input, self.output, self.messages, self.causes)
    }
}
