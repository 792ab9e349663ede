//! Built-in tools.
//!
//! `get_weather` answers from a fixed table of city reports. It is the tool
//! the default weather agent is wired with.
//!
//! ```rust
//! use helm::tools::builtin::lookup_weather;
//! use helm::tools::ToolOutcome;
//!
//! assert!(lookup_weather("New York").is_success());
//! assert!(matches!(lookup_weather("Paris"), ToolOutcome::Error { .. }));
//! ```

use tracing::debug;

use crate::tools::tool::AgentTool;
use crate::tools::types::{AgentToolParameters, ToolOutcome};

pub const WEATHER_TOOL_NAME: &str = "get_weather";

const WEATHER_REPORTS: &[(&str, &str)] = &[
    (
        "newyork",
        "The weather in New York is sunny with a temperature of 25°C.",
    ),
    (
        "london",
        "It's cloudy in London with a temperature of 15°C.",
    ),
    (
        "tokyo",
        "Tokyo is experiencing light rain and a temperature of 18°C.",
    ),
];

/// Look up the current weather report for `city`.
///
/// Matching ignores case and spaces, so `"New York"` and `"newyork"` hit the
/// same entry. Unknown cities produce an error outcome rather than a fault.
pub fn lookup_weather(city: &str) -> ToolOutcome {
    debug!(city, "get_weather called");
    let normalized: String = city
        .chars()
        .filter(|c| *c != ' ')
        .flat_map(char::to_lowercase)
        .collect();

    WEATHER_REPORTS
        .iter()
        .find(|(key, _)| *key == normalized)
        .map(|(_, report)| ToolOutcome::success(*report))
        .unwrap_or_else(|| {
            ToolOutcome::error(format!(
                "Sorry, I don't have weather information for '{city}'."
            ))
        })
}

/// Create the `get_weather` tool.
pub fn weather_tool() -> AgentTool {
    AgentTool::from_fn(
        WEATHER_TOOL_NAME,
        "Retrieves the current weather report for a specified city.",
        AgentToolParameters::object()
            .string(
                "city",
                "The name of the city (e.g., \"New York\", \"London\", \"Tokyo\").",
                true,
            )
            .build(),
        |args| Ok(lookup_weather(args.get_str("city")?)),
    )
}
