#![allow(dead_code)]

pub mod mocks;

use std::cell::RefCell;

use hello_batch::{
    BatchError,
    core::step::{ChunkContext, RepeatStatus, StepContribution, Tasklet},
};

/// Records every invocation in a shared journal, then answers with the
/// scripted statuses (the last one is repeated once the script runs out).
pub struct ScriptedTasklet<'a> {
    label: &'static str,
    journal: &'a RefCell<Vec<String>>,
    script: RefCell<Vec<Result<RepeatStatus, String>>>,
}

impl<'a> ScriptedTasklet<'a> {
    pub fn finishing(label: &'static str, journal: &'a RefCell<Vec<String>>) -> Self {
        Self::new(label, journal, vec![Ok(RepeatStatus::Finished)])
    }

    pub fn failing(label: &'static str, journal: &'a RefCell<Vec<String>>, message: &str) -> Self {
        Self::new(label, journal, vec![Err(message.to_string())])
    }

    /// Continues `times` times, then finishes.
    pub fn continuing(label: &'static str, journal: &'a RefCell<Vec<String>>, times: usize) -> Self {
        let mut script = vec![Ok(RepeatStatus::Continuable); times];
        script.push(Ok(RepeatStatus::Finished));
        Self::new(label, journal, script)
    }

    pub fn new(
        label: &'static str,
        journal: &'a RefCell<Vec<String>>,
        mut script: Vec<Result<RepeatStatus, String>>,
    ) -> Self {
        script.reverse();
        Self {
            label,
            journal,
            script: RefCell::new(script),
        }
    }

    pub fn invocations(&self) -> usize {
        self.journal
            .borrow()
            .iter()
            .filter(|entry| entry.as_str() == self.label)
            .count()
    }
}

impl Tasklet for ScriptedTasklet<'_> {
    fn execute(
        &self,
        _contribution: &mut StepContribution,
        _chunk_context: &ChunkContext<'_>,
    ) -> Result<RepeatStatus, BatchError> {
        self.journal.borrow_mut().push(self.label.to_string());

        let mut script = self.script.borrow_mut();
        let next = if script.len() > 1 {
            script.pop()
        } else {
            script.last().cloned()
        };

        match next {
            Some(Ok(status)) => Ok(status),
            Some(Err(message)) => Err(BatchError::Tasklet(message)),
            None => Ok(RepeatStatus::Finished),
        }
    }
}
