//! Terminal presentation of pipeline outcomes.

use marquee_search::{MovieDetail, PipelineOutcome, RatingTier};

const CARD_WIDTH: usize = 72;

/// Output options for the terminal gallery.
#[derive(Debug, Clone, Copy)]
pub struct RenderStyle {
    /// Emit ANSI colour codes for ratings
    pub color: bool,
}

/// Status line shown instead of, or after, the card grid.
pub fn status_message(outcome: &PipelineOutcome) -> Option<String> {
    match outcome {
        PipelineOutcome::Results { items, truncated } => {
            truncated.then(|| format!("Only {} movie(s) shown.", items.len()))
        }
        PipelineOutcome::EmptySearch => Some("No results found.".to_string()),
        PipelineOutcome::NoUsablePosters => Some("No valid posters found.".to_string()),
        PipelineOutcome::NoLoadablePosters => {
            Some("No valid posters could be loaded.".to_string())
        }
        PipelineOutcome::SearchFailed { message } => Some(message.clone()),
    }
}

/// Renders the whole outcome: cards first, status line last.
pub fn render_outcome(outcome: &PipelineOutcome, style: RenderStyle) -> String {
    let mut output = String::new();

    for detail in outcome.items() {
        output.push_str(&render_card(detail, style));
        output.push('\n');
    }

    if let Some(message) = status_message(outcome) {
        output.push_str(&message);
        output.push('\n');
    }

    output
}

/// Renders one result card.
pub fn render_card(detail: &MovieDetail, style: RenderStyle) -> String {
    let rule = "-".repeat(CARD_WIDTH);
    let mut lines = vec![
        rule.clone(),
        detail.title.clone(),
        format!("{} \u{b7} {}", detail.genre, detail.year),
    ];
    lines.extend(wrap(&detail.plot, CARD_WIDTH));
    lines.push(format!(
        "IMDb Rating: {}",
        paint_rating(&detail.rating_value, detail.rating_tier(), style)
    ));
    lines.push(format!("Poster: {}", detail.poster_url));
    lines.push(rule);
    lines.join("\n")
}

fn paint_rating(value: &str, tier: RatingTier, style: RenderStyle) -> String {
    if !style.color {
        return value.to_string();
    }
    let code = match tier {
        RatingTier::High => "32",
        RatingTier::Medium => "33",
        RatingTier::Low => "31",
        RatingTier::Unrated => "90",
    };
    format!("\x1b[{code}m{value}\x1b[0m")
}

fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }

    lines
}
