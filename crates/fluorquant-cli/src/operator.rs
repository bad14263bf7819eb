use console::{Style, Term};
use indicatif::ProgressBar;

use fluorquant_core::interaction::{
    Operator, ReviewDecision, RevisionRequest, ThresholdDecision, ThresholdPreview,
};
use fluorquant_core::pipeline::BatchReport;
use fluorquant_core::region::CandidateRegions;
use fluorquant_core::segmentation::DetectionConfig;

/// Prompts on the terminal. The progress bar is hidden while a prompt is
/// open.
pub struct TerminalOperator {
    term: Term,
    bar: ProgressBar,
    /// Detection settings the batch started with.
    base_detection: DetectionConfig,
    /// Settings of the current image, including earlier revisions.
    detection: DetectionConfig,
    label: Style,
    value: Style,
    warn: Style,
}

impl TerminalOperator {
    pub fn new(bar: ProgressBar, detection: DetectionConfig) -> Self {
        Self {
            term: Term::stdout(),
            bar,
            base_detection: detection.clone(),
            detection,
            label: Style::new().cyan().bold(),
            value: Style::new().bold().white(),
            warn: Style::new().yellow(),
        }
    }

    /// Print `lines`, then read one answer. `None` when stdin is closed.
    fn ask(&self, lines: &[String], prompt: &str) -> Option<String> {
        self.bar.suspend(|| {
            for line in lines {
                self.term.write_line(line).ok()?;
            }
            self.term.write_str(prompt).ok()?;
            self.term.read_line().ok()
        })
    }

    fn say(&self, line: &str) {
        self.bar.suspend(|| {
            let _ = self.term.write_line(line);
        });
    }
}

impl Operator for TerminalOperator {
    fn adjust_threshold(
        &mut self,
        label: &str,
        preview: &ThresholdPreview,
    ) -> Option<ThresholdDecision> {
        // A new image starts from the batch settings.
        self.detection = self.base_detection.clone();

        let lines = vec![
            String::new(),
            format!("{}", self.label.apply_to(label)),
            format!(
                "  Suggested threshold {} (range {:.1}..{:.1}, {:.1}% foreground)",
                self.value.apply_to(format!("{:.2}", preview.suggested)),
                preview.min,
                preview.max,
                preview.foreground_fraction * 100.0
            ),
        ];
        loop {
            let answer = self.ask(
                &lines,
                "  Threshold [Enter keeps, number overrides, q aborts]: ",
            )?;
            match parse_threshold_answer(&answer) {
                Ok(decision) => return Some(decision),
                Err(msg) => self.say(&format!("  {}", self.warn.apply_to(msg))),
            }
        }
    }

    fn review_detection(
        &mut self,
        label: &str,
        regions: &CandidateRegions,
    ) -> Option<ReviewDecision> {
        let mut lines = vec![format!(
            "  {}: {} region(s)",
            self.label.apply_to(label),
            self.value.apply_to(regions.len())
        )];
        for region in regions.iter() {
            lines.push(format!(
                "    #{:<3} area {:>7}  circularity {:.3}  centre ({:.0}, {:.0})",
                region.id,
                region.area(),
                region.circularity,
                region.centroid.1,
                region.centroid.0
            ));
        }
        lines.push(
            "  Enter accepts; `t <value>` re-thresholds; `area <min> <max>`, \
             `circ <min> <max>` and `edges on|off` change the filter; q aborts"
                .to_string(),
        );

        loop {
            let answer = self.ask(&lines, "  Review: ")?;
            match parse_review_answer(&answer, &self.detection) {
                Ok(decision) => {
                    if let ReviewDecision::Revise(RevisionRequest {
                        detection: Some(ref detection),
                        ..
                    }) = decision
                    {
                        self.detection = detection.clone();
                    }
                    return Some(decision);
                }
                Err(msg) => self.say(&format!("  {}", self.warn.apply_to(msg))),
            }
        }
    }

    fn correct_regions(&mut self, label: &str, regions: &mut CandidateRegions) {
        let header = vec![format!(
            "  {}: manual corrections (Enter to finish)",
            self.label.apply_to(label)
        )];
        let Some(answer) = self.ask(&header, "  Remove ids: ") else {
            return;
        };
        for token in answer.split_whitespace() {
            let removed = token.parse::<u32>().ok().and_then(|id| regions.remove(id));
            if removed.is_none() {
                let msg = format!("no region {token}");
                self.say(&format!("  {}", self.warn.apply_to(msg)));
            }
        }

        loop {
            let prompt = "  Add rectangle <row0> <col0> <row1> <col1>: ";
            let Some(answer) = self.ask(&[], prompt) else {
                return;
            };
            if answer.trim().is_empty() {
                return;
            }
            let result = parse_rectangle(&answer)
                .and_then(|pixels| regions.insert_pixels(pixels).map_err(|e| e.to_string()));
            match result {
                Ok(id) => self.say(&format!("  added region #{id}")),
                Err(msg) => self.say(&format!("  {}", self.warn.apply_to(msg))),
            }
        }
    }

    fn acknowledge_batch(&mut self, report: &BatchReport) {
        let lines = vec![
            String::new(),
            format!(
                "  Batch finished: {} processed, {} failed",
                self.value.apply_to(report.processed.len()),
                self.value.apply_to(report.failures.len())
            ),
        ];
        let _ = self.ask(&lines, "  Press Enter to reveal the results ");
    }
}

fn parse_threshold_answer(answer: &str) -> Result<ThresholdDecision, String> {
    match answer.trim() {
        "" => Ok(ThresholdDecision::Keep),
        "q" | "quit" => Ok(ThresholdDecision::AbortBatch),
        other => other
            .parse::<f32>()
            .ok()
            .filter(|v| v.is_finite())
            .map(ThresholdDecision::Use)
            .ok_or_else(|| format!("not a threshold: {other}")),
    }
}

fn parse_review_answer(
    answer: &str,
    current: &DetectionConfig,
) -> Result<ReviewDecision, String> {
    let tokens: Vec<&str> = answer.split_whitespace().collect();
    let number = |s: &str| s.parse::<f64>().map_err(|_| format!("not a number: {s}"));

    let request = match tokens.as_slice() {
        [] | ["a"] | ["accept"] => return Ok(ReviewDecision::Accept),
        ["q"] | ["quit"] => return Ok(ReviewDecision::AbortBatch),
        ["t", value] => RevisionRequest {
            threshold: Some(
                value
                    .parse::<f32>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| format!("not a threshold: {value}"))?,
            ),
            detection: None,
        },
        ["area", min, max] => RevisionRequest {
            threshold: None,
            detection: Some(DetectionConfig {
                min_area: number(*min)?,
                max_area: number(*max)?,
                ..current.clone()
            }),
        },
        ["circ", min, max] => RevisionRequest {
            threshold: None,
            detection: Some(DetectionConfig {
                min_circularity: number(*min)?,
                max_circularity: number(*max)?,
                ..current.clone()
            }),
        },
        ["edges", flag @ ("on" | "off")] => RevisionRequest {
            threshold: None,
            detection: Some(DetectionConfig {
                exclude_edges: *flag == "on",
                ..current.clone()
            }),
        },
        _ => return Err(format!("unrecognised answer: {}", answer.trim())),
    };
    if let Some(detection) = &request.detection {
        detection.validate().map_err(|e| e.to_string())?;
    }
    Ok(ReviewDecision::Revise(request))
}

/// Inclusive rectangle as (row, col) pixels.
fn parse_rectangle(answer: &str) -> Result<Vec<(usize, usize)>, String> {
    let coords = answer
        .split_whitespace()
        .map(|s| s.parse::<usize>().map_err(|_| format!("not a pixel index: {s}")))
        .collect::<Result<Vec<_>, _>>()?;
    let [r0, c0, r1, c1] = coords[..] else {
        return Err("expected four numbers".to_string());
    };
    let (r0, r1) = (r0.min(r1), r0.max(r1));
    let (c0, c1) = (c0.min(c1), c0.max(c1));
    Ok((r0..=r1)
        .flat_map(|r| (c0..=c1).map(move |c| (r, c)))
        .collect())
}
