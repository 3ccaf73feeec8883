use crate::pyfmt::{fixed, general};
use crate::ttest::{GroupVerdict, Verdict};
use crate::TestKind;

pub const VOL_HEADER: &str = "Volatility (post − pre) results:";
pub const IMPACT_HEADER: &str = "Event-day impact results:";

/// Window lengths quoted in the sentences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NarrativeContext {
    pub pre_days: usize,
    pub post_days: usize,
    pub baseline_window: usize,
}

impl Default for NarrativeContext {
    fn default() -> Self {
        Self {
            pre_days: evs_window::DEFAULT_PRE_DAYS,
            post_days: evs_window::DEFAULT_POST_DAYS,
            baseline_window: evs_window::DEFAULT_BASELINE_WINDOW,
        }
    }
}

/// One sentence for one group's verdict.
pub fn render(gv: &GroupVerdict, ctx: &NarrativeContext) -> String {
    let (s, e) = (&gv.symbol, &gv.event);
    let (mean, n, t, p, significant) = match gv.verdict {
        Verdict::Insufficient { n } => {
            return format!("{s} ({e}): Not enough observations (n={n}).");
        }
        Verdict::Tested {
            mean,
            n,
            statistic,
            p_value,
            significant,
        } => (mean, n, statistic, p_value, significant),
    };
    if mean.is_nan() {
        return format!("{s} ({e}): Not enough data.");
    }

    let t = fixed(t, 2);
    let p = general(p, 3);

    match gv.kind {
        TestKind::VolDelta => {
            let m = fixed(mean, 6);
            if significant {
                let direction = if mean > 0.0 {
                    "higher"
                } else if mean < 0.0 {
                    "lower"
                } else {
                    "no change"
                };
                format!(
                    "{s} ({e}): Statistically significant change in post vs pre volatility \
                     (mean Δ={m}, n={n}, t={t}, p={p}). \
                     This means daily noise is {direction} in the {} days after the event \
                     compared to the {} days before.",
                    ctx.post_days, ctx.pre_days
                )
            } else {
                format!(
                    "{s} ({e}): Not statistically different from zero \
                     (mean Δ={m}, n={n}, t={t}, p={p}). \
                     This means typical events do not change daily volatility in a consistent \
                     way for this asset."
                )
            }
        }
        TestKind::ImpactRatio => {
            let m = fixed(mean, 3);
            if significant {
                let size = if mean > 1.0 {
                    "larger-than-usual"
                } else if mean < 1.0 {
                    "smaller-than-usual"
                } else {
                    "typical-sized"
                };
                format!(
                    "{s} ({e}): Statistically significant difference from typical day \
                     (mean ratio={m}, n={n}, t={t}, p={p}). \
                     This means {size} moves on event days relative to the prior {}-day baseline.",
                    ctx.baseline_window
                )
            } else {
                format!(
                    "{s} ({e}): Not statistically different from typical day \
                     (mean ratio={m}, n={n}, t={t}, p={p}). \
                     This means event-day moves are broadly in line with recent norms."
                )
            }
        }
    }
}

/// Header, volatility sentences, blank line, header, impact sentences.
pub fn summary_lines(vol: &[GroupVerdict], impact: &[GroupVerdict], ctx: &NarrativeContext) -> Vec<String> {
    let mut lines = Vec::with_capacity(vol.len() + impact.len() + 3);
    lines.push(VOL_HEADER.to_string());
    lines.extend(vol.iter().map(|v| render(v, ctx)));
    lines.push(String::new());
    lines.push(IMPACT_HEADER.to_string());
    lines.extend(impact.iter().map(|v| render(v, ctx)));
    lines
}

/// [`summary_lines`] joined with `\n` (no trailing newline).
pub fn render_summary(vol: &[GroupVerdict], impact: &[GroupVerdict], ctx: &NarrativeContext) -> String {
    summary_lines(vol, impact, ctx).join("\n")
}
