use crate::engine::Engine;

use grader_protocol::{Submission, Verdict};

use async_trait::async_trait;

/// Something that turns one submission into one verdict.
///
/// [`Engine`] judges by running the code. Other judges (e.g. a model-based
/// reviewer) live outside this crate and plug in here.
#[async_trait]
pub trait Judge: Send + Sync {
    async fn judge(&self, submission: &Submission) -> Verdict;

    /// One verdict per input, in input order, each with `submission.stdin`
    /// replaced by the input.
    async fn judge_each(&self, submission: &Submission, inputs: &[String]) -> Vec<Verdict> {
        let mut verdicts = Vec::with_capacity(inputs.len());
        for input in inputs {
            let submission = submission.clone().with_stdin(input.as_str());
            verdicts.push(self.judge(&submission).await);
        }
        verdicts
    }
}

#[async_trait]
impl Judge for Engine {
    async fn judge(&self, submission: &Submission) -> Verdict {
        self.execute(submission).await
    }

    async fn judge_each(&self, submission: &Submission, inputs: &[String]) -> Vec<Verdict> {
        self.execute_each(submission, inputs).await
    }
}
