//! `Plan`: the ordered primitive steps of the first complete plan found.

use std::fmt;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use htn_kernel::carrier::task::Task;
use htn_kernel::proof::hash::{canonical_hash, ContentHash};
use htn_kernel::proof::hash_domain::HashDomain;

use crate::trace::TaskRecordV1;

/// Primitive tasks in the order their operators were applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan<A> {
    steps: Vec<Task<A>>,
}

impl<A> Plan<A> {
    pub(crate) fn from_steps(steps: Vec<Task<A>>) -> Self {
        Self { steps }
    }

    #[must_use]
    pub fn steps(&self) -> &[Task<A>] {
        &self.steps
    }

    /// Steps as `(name, args)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[A])> {
        self.steps.iter().map(|t| (t.name(), t.args()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// An empty plan is a valid success: the goal already held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    #[must_use]
    pub fn into_steps(self) -> Vec<Task<A>> {
        self.steps
    }
}

impl<'a, A> IntoIterator for &'a Plan<A> {
    type Item = &'a Task<A>;
    type IntoIter = std::slice::Iter<'a, Task<A>>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

impl<A: fmt::Display> Plan<A> {
    /// Human-readable listing:
    ///
    /// ```text
    /// HTN Actions:
    /// 1.  pickup(blue, left)
    /// 2.  place(blue, center, left)
    /// ```
    #[must_use]
    pub fn render_actions(&self) -> String {
        let mut out = String::from("HTN Actions:\n");
        for (i, step) in self.steps.iter().enumerate() {
            let _ = writeln!(out, "{}.  {step}", i + 1);
        }
        out
    }

    /// Numbered, space-joined steps for an external executor.
    #[must_use]
    pub fn step_messages(&self) -> Vec<StepMessage> {
        self.steps
            .iter()
            .zip(1u64..)
            .map(|(step, num)| StepMessage {
                num,
                step: step.step_line(),
            })
            .collect()
    }

    /// Serializable form of the plan.
    #[must_use]
    pub fn to_record(&self) -> PlanRecordV1 {
        PlanRecordV1 {
            steps: self.steps.iter().map(TaskRecordV1::from_task).collect(),
        }
    }
}

/// One executor message: 1-based step number and `name arg0 arg1 ...`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepMessage {
    pub num: u64,
    pub step: String,
}

/// Plan as rendered task records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanRecordV1 {
    pub steps: Vec<TaskRecordV1>,
}

impl PlanRecordV1 {
    /// # Errors
    ///
    /// Returns the `serde_json` error if serialization fails.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Content hash under [`HashDomain::PlanRecord`].
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if serialization fails.
    pub fn digest(&self) -> Result<ContentHash, serde_json::Error> {
        Ok(canonical_hash(HashDomain::PlanRecord, &self.to_json_bytes()?))
    }
}
