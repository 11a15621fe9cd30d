//! The presentation seam: transcript, result summaries, route panel,
//! input controls. The actual chat/panel UI is an external collaborator;
//! this trait is everything the orchestrator tells it.

use shelternav_core::{RoutePath, RouteStep, SearchResult};

/// Who a transcript message is from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Bot,
}

/// Payload for the route side panel.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSummary {
    pub distance_km: f64,
    pub duration_minutes: u64,
    pub steps: Vec<RouteStep>,
}

impl RouteSummary {
    #[must_use]
    pub fn from_path(path: &RoutePath) -> Self {
        Self {
            distance_km: path.distance_km(),
            duration_minutes: path.duration_minutes(),
            steps: path.steps.clone(),
        }
    }
}

/// Everything the orchestrator exposes to the presentation layer.
///
/// Methods take `&self`; implementations are shared across concurrent
/// search runs and use interior mutability where they record state.
pub trait Presenter: Send + Sync {
    fn message(&self, role: Role, text: &str);

    /// Renders the search outcome. `offer_directions` is the directions
    /// affordance: present iff the intent gate allowed route guidance.
    fn shelter_summary(&self, result: &SearchResult, offer_directions: bool);

    /// Populates the route panel, or clears and hides it on `None`.
    fn route_summary(&self, summary: Option<&RouteSummary>);

    /// Manual mutual exclusion for the input surface during a search.
    fn set_controls_enabled(&self, enabled: bool);
}

/// Terminal presenter for the CLI binary.
pub struct ConsolePresenter;

impl Presenter for ConsolePresenter {
    fn message(&self, role: Role, text: &str) {
        match role {
            Role::User => println!("you> {text}"),
            Role::Bot => println!("bot> {text}"),
        }
    }

    fn shelter_summary(&self, result: &SearchResult, offer_directions: bool) {
        println!("bot> shelters near {}:", result.origin_label);
        for (i, shelter) in result.shelters.iter().enumerate() {
            let distance = shelter.distance_km.unwrap_or_default();
            let tag = if i == 0 { "nearest" } else { "       " };
            println!(
                "     {tag} {:.2} km  {} ({}, capacity {})",
                distance, shelter.name, shelter.address, shelter.capacity
            );
        }
        if offer_directions {
            println!("     walking route to the nearest shelter follows below");
        }
    }

    fn route_summary(&self, summary: Option<&RouteSummary>) {
        let Some(summary) = summary else {
            return;
        };
        println!(
            "bot> route: {:.1} km, about {} min",
            summary.distance_km, summary.duration_minutes
        );
        for step in &summary.steps {
            match step.leg_distance_m {
                Some(meters) => {
                    println!("     {}. {} ({meters:.0} m)", step.index, step.instruction);
                }
                None => println!("     {}. {}", step.index, step.instruction),
            }
        }
    }

    fn set_controls_enabled(&self, _enabled: bool) {
        // The terminal has no input controls to lock; one command is one
        // search.
    }
}
