//! Search orchestration.
//!
//! One search runs the sequence: mint a generation, reset overlays, disable
//! controls, collect an origin (device position or the backend's location
//! extraction), rank candidates, apply the directions gate, render. Every
//! await is a suspension point: a newer search may have started by the time
//! it resumes, so each step re-checks its generation token and discards
//! stale work without touching overlays or the route panel. Controls are
//! re-enabled on every terminal path of the current generation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use shelternav_api::{parse_route, AssistantClient, WireShelter};
use shelternav_core::{rank, should_show_directions, Coordinate, SearchResult, Shelter};
use shelternav_map::OverlayManager;

use crate::geoloc::GeoProvider;
use crate::presenter::{Presenter, Role, RouteSummary};

/// Backend availability, probed once at startup.
///
/// With the backend unreachable the app runs in a degraded local mode:
/// text search is refused up front, current-location search still tries
/// the nearest-shelters endpoint directly.
#[derive(Debug, Clone, Copy)]
pub struct BackendMode {
    pub available: bool,
    pub use_llm: bool,
}

impl BackendMode {
    /// Probes `GET /api/status`; any failure means degraded local mode.
    pub async fn probe(client: &AssistantClient) -> Self {
        match client.status().await {
            Ok(status) => {
                tracing::info!(
                    llm_available = status.llm_available,
                    total_shelters = status.total_shelters,
                    "backend reachable"
                );
                Self {
                    available: true,
                    use_llm: status.llm_available,
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "backend unreachable, running in local mode");
                Self {
                    available: false,
                    use_llm: false,
                }
            }
        }
    }
}

/// How one search run ended. `Stale` means a newer generation superseded
/// this run; the newer run owns the controls and the message stream, so a
/// stale run must not touch either.
enum Outcome {
    Completed,
    NoResults(String),
    Failed(String),
    Stale,
}

/// Sequences searches against the backend, the overlay manager, and the
/// presentation seams. Cheap to clone; clones share the generation counter
/// and overlay state, so a search started on one clone supersedes a search
/// in flight on another.
pub struct SearchOrchestrator<P, G> {
    client: Arc<AssistantClient>,
    overlays: Arc<Mutex<OverlayManager>>,
    presenter: Arc<P>,
    geo: Arc<G>,
    generation: Arc<AtomicU64>,
    nearest_k: usize,
    mode: BackendMode,
}

impl<P, G> Clone for SearchOrchestrator<P, G> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            overlays: Arc::clone(&self.overlays),
            presenter: Arc::clone(&self.presenter),
            geo: Arc::clone(&self.geo),
            generation: Arc::clone(&self.generation),
            nearest_k: self.nearest_k,
            mode: self.mode,
        }
    }
}

impl<P: Presenter, G: GeoProvider> SearchOrchestrator<P, G> {
    pub fn new(
        client: AssistantClient,
        overlays: OverlayManager,
        presenter: P,
        geo: G,
        nearest_k: usize,
        mode: BackendMode,
    ) -> Self {
        Self::with_shared(client, overlays, Arc::new(presenter), Arc::new(geo), nearest_k, mode)
    }

    /// Like [`new`](Self::new), but the presenter and geolocation provider
    /// are shared handles the caller keeps a reference to.
    pub fn with_shared(
        client: AssistantClient,
        overlays: OverlayManager,
        presenter: Arc<P>,
        geo: Arc<G>,
        nearest_k: usize,
        mode: BackendMode,
    ) -> Self {
        Self {
            client: Arc::new(client),
            overlays: Arc::new(Mutex::new(overlays)),
            presenter,
            geo,
            generation: Arc::new(AtomicU64::new(0)),
            nearest_k,
            mode,
        }
    }

    /// Runs a free-text search. Queries asking for the current location are
    /// routed to the geolocation path.
    pub async fn search_text(&self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            self.presenter.message(
                Role::Bot,
                "Please enter a place name, or ask for your current location.",
            );
            return;
        }
        self.presenter.message(Role::User, query);

        let generation = self.begin();
        let outcome = if is_current_location_query(query) {
            self.run_geolocation(generation).await
        } else {
            self.run_text(generation, query).await
        };
        self.finish(generation, outcome);
    }

    /// Runs a search from the device's current position.
    pub async fn search_current_location(&self) {
        self.presenter
            .message(Role::User, "find shelters near my current location");
        let generation = self.begin();
        let outcome = self.run_geolocation(generation).await;
        self.finish(generation, outcome);
    }

    /// Mints a new generation, clears every overlay from the previous one,
    /// and locks the input surface.
    fn begin(&self) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.presenter.set_controls_enabled(false);
        self.overlays().reset_all();
        tracing::debug!(generation, "search started");
        generation
    }

    fn finish(&self, generation: u64, outcome: Outcome) {
        match outcome {
            Outcome::Stale => {
                // The superseding search owns the controls now.
                tracing::info!(generation, "search superseded, result discarded");
                return;
            }
            Outcome::Completed => {
                tracing::debug!(generation, "search completed");
            }
            Outcome::NoResults(message) => {
                tracing::debug!(generation, "search produced no results");
                self.presenter.message(Role::Bot, &message);
            }
            Outcome::Failed(message) => {
                tracing::warn!(generation, message, "search failed");
                self.presenter.message(Role::Bot, &message);
            }
        }
        self.presenter.set_controls_enabled(true);
    }

    async fn run_text(&self, generation: u64, query: &str) -> Outcome {
        if !self.mode.available {
            return Outcome::Failed(
                "The assistant backend is unreachable. Try a current-location search instead."
                    .to_string(),
            );
        }

        self.presenter
            .message(Role::Bot, "Looking up the place you described...");
        // Staleness is decided on resumption, before looking at the result:
        // a superseded search's failure must stay as silent as its success.
        let response = self.client.extract_location(query, self.mode.use_llm).await;
        if !self.is_current(generation) {
            return Outcome::Stale;
        }
        let response = match response {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "location extraction failed");
                return Outcome::Failed(
                    "Could not reach the assistant backend. Please try again.".to_string(),
                );
            }
        };

        if !response.success {
            return Outcome::Failed(response.message.unwrap_or_else(|| {
                "Could not recognise a place name in that query.".to_string()
            }));
        }
        if let Some(message) = &response.message {
            self.presenter.message(Role::Bot, message);
        }

        let Some([lat, lon]) = response.coordinates else {
            // Text-only answer (guideline, chit-chat): nothing to map.
            return Outcome::Completed;
        };
        let origin = match Coordinate::new(lat, lon) {
            Ok(origin) => origin,
            Err(e) => {
                tracing::warn!(error = %e, "backend returned an invalid origin");
                return Outcome::Failed("The backend returned an unusable location.".to_string());
            }
        };

        let shelters = convert_shelters(response.shelters);
        if shelters.is_empty() {
            return Outcome::NoResults("No shelters found around that location.".to_string());
        }

        let result = SearchResult {
            origin,
            origin_label: response
                .location
                .unwrap_or_else(|| "searched location".to_string()),
            shelters: rank(origin, shelters),
            intent: response.intent,
            tool_used: response.tool_used,
        };
        self.render(generation, &result).await
    }

    async fn run_geolocation(&self, generation: u64) -> Outcome {
        self.presenter.message(Role::Bot, "Locating your position...");
        let position = self.geo.current_position().await;
        if !self.is_current(generation) {
            return Outcome::Stale;
        }
        let origin = match position {
            Ok(origin) => origin,
            Err(e) => return Outcome::Failed(format!("Could not get your position: {e}")),
        };

        self.presenter.message(
            Role::Bot,
            &format!(
                "Position fixed at lat {:.4}, lon {:.4}. Searching nearby shelters...",
                origin.lat(),
                origin.lon()
            ),
        );
        let response = self.client.nearest_shelters(origin, self.nearest_k).await;
        if !self.is_current(generation) {
            return Outcome::Stale;
        }
        let wires = match response {
            Ok(wires) => wires,
            Err(e) => {
                tracing::warn!(error = %e, "nearest-shelter lookup failed");
                return Outcome::Failed(
                    "Could not fetch nearby shelters. Please try again.".to_string(),
                );
            }
        };

        let shelters = convert_shelters(wires);
        if shelters.is_empty() {
            return Outcome::NoResults("No shelters found near your position.".to_string());
        }

        let result = SearchResult {
            origin,
            origin_label: "Current location".to_string(),
            shelters: rank(origin, shelters),
            // A geolocation search is implicitly navigational; the gate only
            // suppresses it on a single result.
            intent: None,
            tool_used: None,
        };
        self.render(generation, &result).await
    }

    /// Draws the result: summary + shelter markers always, route + animator
    /// only when the gate permits.
    async fn render(&self, generation: u64, result: &SearchResult) -> Outcome {
        {
            let mut overlays = self.overlays();
            overlays.set_user_marker(result.origin, &result.origin_label);
            overlays.set_shelter_markers(&result.shelters);
        }

        let offer_directions = should_show_directions(
            result.intent.as_deref(),
            result.tool_used.as_deref(),
            result.shelters.len(),
        );
        self.presenter.shelter_summary(result, offer_directions);

        if !offer_directions {
            // An informational result must also take down any route panel
            // left over from an earlier navigational search.
            self.presenter.route_summary(None);
            tracing::debug!(
                generation,
                intent = result.intent.as_deref().unwrap_or("none"),
                "directions suppressed"
            );
            return Outcome::Completed;
        }

        let Some(nearest) = result.nearest() else {
            return Outcome::Completed;
        };
        let response = self.client.directions(result.origin, nearest.coordinate).await;
        if !self.is_current(generation) {
            return Outcome::Stale;
        }
        let collection = match response {
            Ok(collection) => collection,
            Err(e) => {
                tracing::warn!(error = %e, "directions fetch failed");
                self.presenter.route_summary(None);
                self.presenter
                    .message(Role::Bot, "Could not fetch a walking route.");
                return Outcome::Completed;
            }
        };

        let route = match parse_route(&collection) {
            Ok(route) => route,
            Err(e) => {
                tracing::warn!(error = %e, "directions response rejected");
                self.presenter.route_summary(None);
                self.presenter
                    .message(Role::Bot, "The routing service returned unusable geometry.");
                return Outcome::Completed;
            }
        };
        if route.is_empty() {
            self.presenter.route_summary(None);
            self.presenter.message(
                Role::Bot,
                "No walking route is available to the nearest shelter.",
            );
            return Outcome::Completed;
        }

        {
            let mut overlays = self.overlays();
            overlays.set_route(&route);
            overlays.start_indicator(&route);
        }
        self.presenter
            .route_summary(Some(&RouteSummary::from_path(&route)));
        Outcome::Completed
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    fn overlays(&self) -> MutexGuard<'_, OverlayManager> {
        self.overlays.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Converts wire shelters, dropping records with invalid coordinates
/// instead of coercing them.
fn convert_shelters(wires: Vec<WireShelter>) -> Vec<Shelter> {
    let mut shelters = Vec::with_capacity(wires.len());
    for wire in wires {
        match wire.into_shelter() {
            Ok(shelter) => shelters.push(shelter),
            Err(e) => tracing::warn!(error = %e, "dropping shelter with invalid coordinate"),
        }
    }
    shelters
}

/// True when the query is asking for the device position rather than a
/// named place. Matches the original assistant's Korean keywords plus
/// English equivalents.
fn is_current_location_query(query: &str) -> bool {
    let lowered = query.to_lowercase();
    ["current location", "my location", "현위치", "내 위치", "현재 위치"]
        .iter()
        .any(|keyword| lowered.contains(keyword))
}
