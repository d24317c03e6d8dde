//! Line-oriented session scripts.
//!
//! One command per line; blank lines and `#` comments are skipped. Result
//! positions are 1-based as printed by `show`.
//!
//! ```text
//! here 35.561,139.716
//! age 0
//! radius 900
//! select 1
//! show
//! ```

use anyhow::{bail, Context};
use nursemap_core::{AgeClass, Point};
use nursemap_session::{Effect, FixedPosition, Geocoder, Navigator, RouteProvider, SessionError};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ScriptCommand {
    /// Device position fix, or `here none` when geolocation is unavailable.
    Here(Option<Point>),
    Click(Point),
    Search(String),
    Age(Option<AgeClass>),
    Radius(u32),
    Home,
    Select(usize),
    Inspect(usize),
    Close,
    Show,
}

pub(crate) fn parse_line(line: &str) -> anyhow::Result<Option<ScriptCommand>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(w, r)| (w, r.trim()));

    let command = match word {
        "here" if rest == "none" => ScriptCommand::Here(None),
        "here" => ScriptCommand::Here(Some(parse_point(rest)?)),
        "click" => ScriptCommand::Click(parse_point(rest)?),
        "search" if rest.is_empty() => bail!("search needs an address"),
        "search" => ScriptCommand::Search(rest.to_string()),
        "age" if rest == "none" => ScriptCommand::Age(None),
        "age" => ScriptCommand::Age(Some(rest.parse::<AgeClass>()?)),
        "radius" => ScriptCommand::Radius(
            rest.parse::<u32>()
                .with_context(|| format!("invalid radius '{rest}'"))?,
        ),
        "home" => ScriptCommand::Home,
        "select" => ScriptCommand::Select(parse_position(rest)?),
        "inspect" => ScriptCommand::Inspect(parse_position(rest)?),
        "close" => ScriptCommand::Close,
        "show" => ScriptCommand::Show,
        other => bail!("unknown command '{other}'"),
    };
    Ok(Some(command))
}

fn parse_point(raw: &str) -> anyhow::Result<Point> {
    raw.parse::<Point>()
        .with_context(|| format!("expected LAT,LNG, got '{raw}'"))
}

/// Parse a 1-based result position into a 0-based index.
fn parse_position(raw: &str) -> anyhow::Result<usize> {
    let position = raw
        .parse::<usize>()
        .with_context(|| format!("invalid result position '{raw}'"))?;
    position
        .checked_sub(1)
        .context("result positions start at 1")
}

/// Apply one command to the navigator. `Show` has no effect on the session.
pub(crate) async fn apply<G, R>(
    navigator: &mut Navigator<G, R>,
    command: ScriptCommand,
) -> Result<Effect, SessionError>
where
    G: Geocoder,
    R: RouteProvider,
{
    match command {
        ScriptCommand::Here(point) => Ok(navigator.locate(&FixedPosition(point)).await),
        ScriptCommand::Click(point) => Ok(navigator.session_mut().map_clicked(point)),
        ScriptCommand::Search(address) => navigator.search_address(&address).await,
        ScriptCommand::Age(age) => Ok(navigator.session_mut().set_age_class(age)),
        ScriptCommand::Radius(meters) => navigator.session_mut().set_radius(meters),
        ScriptCommand::Home => Ok(navigator.session_mut().return_home()),
        ScriptCommand::Select(index) => navigator.select_result(index).await,
        ScriptCommand::Inspect(index) => navigator.session_mut().inspect(index),
        ScriptCommand::Close => Ok(navigator.session_mut().close_overlay()),
        ScriptCommand::Show => Ok(Effect::Unchanged),
    }
}
