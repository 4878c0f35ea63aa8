//! # Commands
//!
//! Every use case runs through one executor, [`EntityCommand`], which owns
//! the run-once [`Lifecycle`] and the translation of storage failures into
//! unsuccessful results. What differs between use cases lives in a
//! [`UseCase`] implementation: a validation step that may reject the request
//! with a specific message, and an operation step that talks to storage.
//!
//! ```text
//! execute() ──► begin ──► storage bound? ──► validate ──► operate ──► finish
//!                              │ no             │ Some(msg)   │ Err
//!                              ▼                ▼             ▼
//!                      NOT_OK_BAD_STORAGE      msg       NOT_OK_ERROR
//! ```
//!
//! Only contract violations (executing twice, reading results early) come
//! back as `Err`; everything else is a finished command with a message.

use crate::error::{RecipeCartError, Result};
use crate::store::EntityStore;
use std::sync::Arc;

pub mod bookmark;
pub mod create;
pub mod create_recipe;
pub mod get;
pub mod search;
pub mod shopping;

pub const NOT_OK: &str = "Not OK";
pub const NOT_OK_ERROR: &str =
    "Execution unsuccessful: an internal error has occurred while trying to execute this task";
pub const NOT_OK_BAD_STORAGE: &str =
    "Execution unsuccessful: an internal error has occurred while trying to execute this task \
     (as a result of internal improper handling of entity storage)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    Executing,
    Finished,
}

/// Run-once state of a command.
///
/// Output, message and success can each be set once, and only while
/// executing. Reading any of them before [`Lifecycle::finish`] is an
/// `IllegalState` error.
#[derive(Debug)]
pub struct Lifecycle<T> {
    phase: Phase,
    successful: bool,
    message: Option<String>,
    output: Option<T>,
}

impl<T> Default for Lifecycle<T> {
    fn default() -> Self {
        Self {
            phase: Phase::NotStarted,
            successful: false,
            message: None,
            output: None,
        }
    }
}

impl<T> Lifecycle<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn begin(&mut self) -> Result<()> {
        if self.phase != Phase::NotStarted {
            return Err(RecipeCartError::IllegalState(
                "command has already been executed",
            ));
        }
        self.phase = Phase::Executing;
        Ok(())
    }

    fn ensure_executing(&self) -> Result<()> {
        match self.phase {
            Phase::Executing => Ok(()),
            Phase::NotStarted => Err(RecipeCartError::IllegalState(
                "command has not started executing",
            )),
            Phase::Finished => Err(RecipeCartError::IllegalState(
                "command has already finished executing",
            )),
        }
    }

    pub fn set_output(&mut self, output: T) -> Result<()> {
        self.ensure_executing()?;
        if self.output.is_some() {
            return Err(RecipeCartError::IllegalState("output has already been set"));
        }
        self.output = Some(output);
        Ok(())
    }

    pub fn set_message(&mut self, message: impl Into<String>) -> Result<()> {
        self.ensure_executing()?;
        if self.message.is_some() {
            return Err(RecipeCartError::IllegalState(
                "execution message has already been set",
            ));
        }
        self.message = Some(message.into());
        Ok(())
    }

    pub fn be_successful(&mut self) -> Result<()> {
        self.ensure_executing()?;
        if self.successful {
            return Err(RecipeCartError::IllegalState(
                "command has already been marked successful",
            ));
        }
        self.successful = true;
        Ok(())
    }

    /// Ends execution. Without a message set, the message is [`NOT_OK`].
    pub fn finish(&mut self) -> Result<()> {
        self.ensure_executing()?;
        if self.message.is_none() {
            self.message = Some(NOT_OK.to_string());
        }
        self.phase = Phase::Finished;
        Ok(())
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    fn ensure_finished(&self) -> Result<()> {
        if self.is_finished() {
            Ok(())
        } else {
            Err(RecipeCartError::IllegalState(
                "command has not finished executing",
            ))
        }
    }

    pub fn is_successful(&self) -> Result<bool> {
        self.ensure_finished()?;
        Ok(self.successful)
    }

    pub fn message(&self) -> Result<&str> {
        self.ensure_finished()?;
        Ok(self.message.as_deref().unwrap_or(NOT_OK))
    }

    /// The produced value; `None` when the command was unsuccessful.
    pub fn output(&self) -> Result<Option<&T>> {
        self.ensure_finished()?;
        Ok(self.output.as_ref())
    }

    pub fn into_output(self) -> Result<Option<T>> {
        self.ensure_finished()?;
        Ok(self.output)
    }
}

/// Result of the operation step of a [`UseCase`].
#[derive(Debug)]
pub enum Step<T> {
    Done { message: &'static str, output: T },
    /// A domain-level refusal found while operating, e.g. a duplicate bookmark.
    Rejected(&'static str),
}

/// The use-case specific part of a command.
pub trait UseCase {
    type Output;

    /// Checks preconditions. `Some(message)` rejects the request.
    fn validate(&self, store: &dyn EntityStore) -> Result<Option<&'static str>>;

    /// Performs the storage work of a validated request.
    fn operate(&self, store: &dyn EntityStore) -> Result<Step<Self::Output>>;

    fn command(self) -> EntityCommand<Self>
    where
        Self: Sized,
    {
        EntityCommand::new(self)
    }
}

/// What a dispatcher needs from any command, independent of its output type.
pub trait Command {
    fn set_storage_source(&mut self, store: Arc<dyn EntityStore>);

    /// Runs the command. A second call fails with `IllegalState`.
    fn execute(&mut self) -> Result<()>;

    fn is_finished_executing(&self) -> bool;
    fn is_successful(&self) -> Result<bool>;
    fn execution_message(&self) -> Result<&str>;

    fn report(&self) -> Result<CmdMessage> {
        let message = self.execution_message()?;
        Ok(if self.is_successful()? {
            CmdMessage::success(message)
        } else {
            CmdMessage::error(message)
        })
    }
}

/// Generic executor binding a [`UseCase`] to a storage source.
pub struct EntityCommand<U: UseCase> {
    use_case: U,
    store: Option<Arc<dyn EntityStore>>,
    lifecycle: Lifecycle<U::Output>,
}

impl<U: UseCase> EntityCommand<U> {
    pub fn new(use_case: U) -> Self {
        Self {
            use_case,
            store: None,
            lifecycle: Lifecycle::new(),
        }
    }

    pub fn with_storage_source(mut self, store: Arc<dyn EntityStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn use_case(&self) -> &U {
        &self.use_case
    }

    pub fn output(&self) -> Result<Option<&U::Output>> {
        self.lifecycle.output()
    }

    pub fn into_output(self) -> Result<Option<U::Output>> {
        self.lifecycle.into_output()
    }

    /// Executes against the storage of an enclosing command instead of a
    /// bound source.
    pub(crate) fn execute_within(&mut self, store: &dyn EntityStore) -> Result<()> {
        self.run(Some(store))
    }

    fn run(&mut self, store: Option<&dyn EntityStore>) -> Result<()> {
        self.lifecycle.begin()?;

        let step = match store {
            Some(store) => self.attempt(store)?,
            None => Step::Rejected(NOT_OK_BAD_STORAGE),
        };

        match step {
            Step::Done { message, output } => {
                self.lifecycle.set_output(output)?;
                self.lifecycle.set_message(message)?;
                self.lifecycle.be_successful()?;
            }
            Step::Rejected(message) => self.lifecycle.set_message(message)?,
        }
        self.lifecycle.finish()?;

        tracing::debug!(
            command = std::any::type_name::<U>(),
            successful = self.lifecycle.successful,
            message = self.lifecycle.message.as_deref().unwrap_or(NOT_OK),
            "command finished"
        );
        Ok(())
    }

    fn attempt(&self, store: &dyn EntityStore) -> Result<Step<U::Output>> {
        match self.use_case.validate(store) {
            Ok(Some(invalid)) => return Ok(Step::Rejected(invalid)),
            Ok(None) => {}
            Err(e) if e.is_illegal_state() => return Err(e),
            Err(e) => {
                tracing::warn!(error = %e, "storage failure while validating command");
                return Ok(Step::Rejected(NOT_OK_ERROR));
            }
        }
        match self.use_case.operate(store) {
            Err(e) if e.is_illegal_state() => Err(e),
            Err(e) => {
                tracing::warn!(error = %e, "storage failure while executing command");
                Ok(Step::Rejected(NOT_OK_ERROR))
            }
            step => step,
        }
    }
}

impl<U: UseCase> Command for EntityCommand<U> {
    fn set_storage_source(&mut self, store: Arc<dyn EntityStore>) {
        self.store = Some(store);
    }

    fn execute(&mut self) -> Result<()> {
        let store = self.store.clone();
        self.run(store.as_deref())
    }

    fn is_finished_executing(&self) -> bool {
        self.lifecycle.is_finished()
    }

    fn is_successful(&self) -> Result<bool> {
        self.lifecycle.is_successful()
    }

    fn execution_message(&self) -> Result<&str> {
        self.lifecycle.message()
    }
}

/// A name is usable when it is present and not blank.
pub(crate) fn usable(name: Option<&str>) -> Option<&str> {
    name.filter(|n| !n.trim().is_empty())
}
