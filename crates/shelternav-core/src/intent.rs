//! The directions gate: decides whether route guidance applies to a search.
//!
//! The intent service classifies each query and reports which lookup tool it
//! used. Some classifications are informational (counts, capacity filters,
//! guidelines, chit-chat) and never want a walking route; a named-facility
//! lookup is informational only when it was satisfied by the by-name tool.

/// Intents that never show route guidance, regardless of tool.
///
/// This is a fixed literal list; intents not on it (including unknown
/// future labels) default to showing directions.
const SUPPRESSED_INTENTS: &[&str] = &[
    "shelter_count",
    "shelter_capacity",
    "disaster_guideline",
    "general_knowledge",
    "general_chat",
];

const FACILITY_INFO_INTENT: &str = "shelter_info";
const BY_NAME_TOOL: &str = "search_shelter_by_name";

/// Decides whether route guidance should be shown for a search result.
///
/// Suppresses (returns `false`) when any of:
/// - `shelter_count <= 1` — a single result needs no route picker;
/// - the intent is in the suppressed set;
/// - the intent is `shelter_info` AND the tool was
///   `search_shelter_by_name` — both must match; `shelter_info` reached
///   through any other tool still shows directions.
///
/// Pure-geolocation searches pass `None` for both labels and therefore show
/// directions whenever more than one shelter was found.
#[must_use]
pub fn should_show_directions(
    intent: Option<&str>,
    tool_used: Option<&str>,
    shelter_count: usize,
) -> bool {
    if shelter_count <= 1 {
        return false;
    }
    match intent {
        Some(intent) if SUPPRESSED_INTENTS.contains(&intent) => false,
        Some(FACILITY_INFO_INTENT) if tool_used == Some(BY_NAME_TOOL) => false,
        _ => true,
    }
}
