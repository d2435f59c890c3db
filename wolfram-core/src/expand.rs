//! Turns a full `/v2/query` result into a speakable list of steps.

use crate::model::{Pod, Step, Subpod};

/// Pods that repeat the spoken answer or only describe the query itself.
pub const SKIPPED_POD_TITLES: &[&str] = &[
    "Input interpretation",
    "Interpretation",
    "Result",
    "Value",
    "Image",
];

pub fn is_skipped(pod: &Pod) -> bool {
    SKIPPED_POD_TITLES.contains(&pod.title.as_str())
}

/// Build the expanded answer for `pods`, in order.
pub fn expand(pods: &[Pod]) -> Vec<Step> {
    let candidates: Vec<Step> = pods
        .iter()
        .filter(|pod| !is_skipped(pod))
        .flat_map(|pod| pod.subpods.iter().filter_map(move |sub| candidate(pod, sub)))
        .collect();

    let count = candidates.len();
    let steps: Vec<Step> = group_by_title(candidates)
        .into_iter()
        .map(speakable)
        .collect();

    tracing::debug!(candidates = count, steps = steps.len(), "expanded answer");
    steps
}

/// Step for a single subpod, or `None` if the subpod is noise.
fn candidate(pod: &Pod, sub: &Subpod) -> Option<Step> {
    let img = &sub.img;

    let title = if !img.title.is_empty() && img.title != img.alt {
        img.title.as_str()
    } else {
        pod.title.as_str()
    };

    if img.alt == pod.title {
        return Some(Step::image(title, img.src.as_str()));
    }

    let alt = img.alt.as_str();
    if is_parenthesized(alt) || alt.trim().is_empty() {
        return None;
    }

    Some(Step::summary(title, alt))
}

fn is_parenthesized(text: &str) -> bool {
    text.starts_with('(') && text.ends_with(')')
}

/// First pass: fold runs of steps sharing a title into one.
///
/// Summaries are joined with a newline; the last image in the run wins.
fn group_by_title(steps: Vec<Step>) -> Vec<Step> {
    steps.into_iter().fold(Vec::new(), |mut out: Vec<Step>, step| {
        match out.last_mut() {
            Some(prev) if prev.title == step.title => {
                prev.summary = match (prev.summary.take(), step.summary) {
                    (Some(a), Some(b)) => Some(format!("{a}\n{b}")),
                    (a, b) => a.or(b),
                };
                if step.img.is_some() {
                    prev.img = step.img;
                }
            }
            _ => out.push(step),
        }
        out
    })
}

/// Second pass: lead every summary with its section title for TTS.
fn speakable(mut step: Step) -> Step {
    if step.title.is_empty() {
        return step;
    }
    if let Some(summary) = step.summary.take() {
        step.summary = Some(format!("{}\n.{}", step.title, summary));
    }
    step
}
