use crate::judge::Judge;

use grader_protocol::{GradeReport, Submission, TestCase, Verdict, VerdictKind};

use tracing::info;

/// Judges `submission` against every test case.
///
/// The judge decides how cases share work; [`crate::Engine`] compiles once
/// and runs the cases in one workspace.
#[tracing::instrument(skip(judge, submission, cases), fields(cases = cases.len()))]
pub async fn grade<J>(judge: &J, submission: &Submission, cases: &[TestCase]) -> GradeReport
where
    J: Judge + ?Sized,
{
    let verdicts = if cases.is_empty() {
        Vec::new()
    } else {
        let inputs: Vec<String> = cases.iter().map(|case| case.input.clone()).collect();
        let verdicts = judge.judge_each(submission, &inputs).await;
        verdicts
            .into_iter()
            .zip(cases)
            .map(|(verdict, case)| check_output(verdict, &case.output))
            .collect()
    };

    let report = summarize(verdicts);
    info!(
        status = %report.status,
        score = report.score,
        passed = report.passed_count,
        "graded"
    );
    report
}

/// Turns an accepted run into `WrongAnswer` if its stdout differs from `expected`.
pub fn check_output(verdict: Verdict, expected: &str) -> Verdict {
    if verdict.is_accepted() && !outputs_match(&verdict.stdout, expected) {
        Verdict::wrong_answer(verdict.stdout, verdict.time)
    } else {
        verdict
    }
}

/// Compares line by line, ignoring trailing whitespace and leading or
/// trailing blank lines.
pub fn outputs_match(actual: &str, expected: &str) -> bool {
    let actual = actual.trim().lines().map(str::trim_end);
    let expected = expected.trim().lines().map(str::trim_end);
    actual.eq(expected)
}

fn summarize(verdicts: Vec<Verdict>) -> GradeReport {
    let total_count = verdicts.len() as u32;
    let passed_count = verdicts.iter().filter(|v| v.is_accepted()).count() as u32;

    if total_count == 0 {
        return GradeReport {
            status: VerdictKind::InternalError.code().to_owned(),
            score: 0,
            passed_count: 0,
            total_count: 0,
            message: "no test cases".to_owned(),
            verdicts,
        };
    }

    let first_failure = verdicts.iter().find(|v| !v.is_accepted());
    let (status, message) = match first_failure {
        Some(v) => (v.kind.code(), v.message.clone()),
        None => {
            let accepted = VerdictKind::Accepted;
            (accepted.code(), accepted.message().to_owned())
        }
    };

    GradeReport {
        status: status.to_owned(),
        score: passed_count * 100 / total_count,
        passed_count,
        total_count,
        message,
        verdicts,
    }
}
