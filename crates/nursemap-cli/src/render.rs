//! Plain-text rendering of the session view.

use nursemap_session::{Effect, ListEntry, SessionView};

fn fmt_count(count: Option<u32>) -> String {
    count.map_or_else(|| "-".to_string(), |n| n.to_string())
}

fn fmt_entry(position: usize, entry: &ListEntry) -> String {
    let mut line = format!(
        "{position:>2}. {:<24}{:>5} m {:>3} min walk  vacancy {:>2}  capacity {:>2}",
        entry.name,
        entry.distance_meters,
        entry.walking_minutes,
        fmt_count(entry.vacancy),
        fmt_count(entry.capacity),
    );
    if let Some(url) = &entry.evaluation_url {
        line.push_str("\n    evaluation: ");
        line.push_str(url);
    }
    line
}

/// Render the whole view as a block of lines.
pub(crate) fn render_view(view: &SessionView) -> String {
    let age = view
        .age_class
        .map_or_else(|| "none".to_string(), |a| a.to_string());
    let mut lines = vec![format!(
        "center {} | radius {} m | age class {age}",
        view.map_center, view.radius_meters
    )];

    if view.entries.is_empty() {
        lines.push(if view.age_class.is_some() {
            "no facility with a vacancy in range".to_string()
        } else {
            "select an age class to search".to_string()
        });
    }
    lines.extend(
        view.entries
            .iter()
            .enumerate()
            .map(|(i, entry)| fmt_entry(i + 1, entry)),
    );

    if let Some(overlay) = &view.overlay {
        lines.push(format!("selected: {} ({})", overlay.name, overlay.address));
        lines.push(format!("  {}", overlay.maps_url));
    }
    if let Some(route) = &view.route {
        let mut parts = vec![format!("{} points", route.path.len())];
        if let Some(meters) = route.distance_meters {
            parts.push(format!("{meters:.0} m"));
        }
        if let Some(secs) = route.duration_secs {
            parts.push(format!("{} min", secs.div_ceil(60)));
        }
        lines.push(format!("route: {}", parts.join(", ")));
    }

    lines.push(format!(
        "data as of {}",
        view.dataset_loaded_at.format("%Y-%m-%d %H:%M UTC")
    ));
    lines.join("\n")
}

/// One-line description of a transition, if it is worth telling the user.
pub(crate) fn describe_effect(effect: &Effect) -> Option<String> {
    match effect {
        Effect::Reranked { results: 1 } => Some("1 facility found".to_string()),
        Effect::Reranked { results } => Some(format!("{results} facilities found")),
        Effect::RouteReady { bounds } => Some(format!(
            "route ready, fit map to {} .. {}",
            bounds.south_west, bounds.north_east
        )),
        Effect::Notice(notice) => Some(notice.to_string()),
        Effect::SelectionChanged | Effect::Stale | Effect::Unchanged => None,
    }
}
