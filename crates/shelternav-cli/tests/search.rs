//! End-to-end orchestrator tests against a wiremock backend and recording
//! fakes for the map surface and the presentation layer.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shelternav_api::AssistantClient;
use shelternav_cli::{
    BackendMode, FixedPosition, GeoProvider, GeolocationError, Presenter, Role, RouteSummary,
    SearchOrchestrator,
};
use shelternav_core::Coordinate;
use shelternav_map::{Facing, MapSurface, MarkerKind, OverlayId, OverlayManager, PolylineStyle};

#[derive(Default)]
struct SurfaceState {
    next_id: u64,
    markers: HashMap<u64, (MarkerKind, String)>,
    polylines: HashMap<u64, PolylineStyle>,
}

/// Map surface that records which overlays are currently alive.
#[derive(Default)]
struct RecordingSurface {
    state: Mutex<SurfaceState>,
}

impl RecordingSurface {
    fn lock(&self) -> std::sync::MutexGuard<'_, SurfaceState> {
        self.state.lock().unwrap()
    }

    fn marker_labels(&self, kind: MarkerKind) -> Vec<String> {
        let state = self.lock();
        let mut labels: Vec<String> = state
            .markers
            .values()
            .filter(|(k, _)| *k == kind)
            .map(|(_, label)| label.clone())
            .collect();
        labels.sort();
        labels
    }

    fn polyline_count(&self) -> usize {
        self.lock().polylines.len()
    }
}

impl MapSurface for RecordingSurface {
    fn add_marker(&self, _position: Coordinate, kind: MarkerKind, label: &str) -> OverlayId {
        let mut state = self.lock();
        state.next_id += 1;
        let id = state.next_id;
        state.markers.insert(id, (kind, label.to_string()));
        OverlayId(id)
    }

    fn add_polyline(&self, _points: &[Coordinate], style: PolylineStyle) -> OverlayId {
        let mut state = self.lock();
        state.next_id += 1;
        let id = state.next_id;
        state.polylines.insert(id, style);
        OverlayId(id)
    }

    fn move_overlay(&self, _id: OverlayId, _position: Coordinate) {}

    fn set_facing(&self, _id: OverlayId, _facing: Facing) {}

    fn remove_overlay(&self, id: OverlayId) {
        let mut state = self.lock();
        state.markers.remove(&id.0);
        state.polylines.remove(&id.0);
    }

    fn fit_bounds(&self, _points: &[Coordinate]) {}
}

#[derive(Default)]
struct PresenterState {
    messages: Vec<(Role, String)>,
    summaries: Vec<(Vec<(String, Option<f64>)>, bool)>,
    route_panels: Vec<Option<RouteSummary>>,
    controls: Vec<bool>,
}

/// Presenter that records every call for later assertions.
#[derive(Default)]
struct RecordingPresenter {
    state: Mutex<PresenterState>,
}

impl RecordingPresenter {
    fn lock(&self) -> std::sync::MutexGuard<'_, PresenterState> {
        self.state.lock().unwrap()
    }

    fn bot_messages(&self) -> Vec<String> {
        self.lock()
            .messages
            .iter()
            .filter(|(role, _)| *role == Role::Bot)
            .map(|(_, text)| text.clone())
            .collect()
    }

    fn last_controls(&self) -> Option<bool> {
        self.lock().controls.last().copied()
    }
}

impl Presenter for RecordingPresenter {
    fn message(&self, role: Role, text: &str) {
        self.lock().messages.push((role, text.to_string()));
    }

    fn shelter_summary(&self, result: &shelternav_core::SearchResult, offer_directions: bool) {
        let rows = result
            .shelters
            .iter()
            .map(|s| (s.name.clone(), s.distance_km))
            .collect();
        self.lock().summaries.push((rows, offer_directions));
    }

    fn route_summary(&self, summary: Option<&RouteSummary>) {
        self.lock().route_panels.push(summary.cloned());
    }

    fn set_controls_enabled(&self, enabled: bool) {
        self.lock().controls.push(enabled);
    }
}

/// Geolocation provider that always refuses with permission denied.
struct DeniedPosition;

impl GeoProvider for DeniedPosition {
    fn current_position(
        &self,
    ) -> impl std::future::Future<Output = Result<Coordinate, GeolocationError>> + Send {
        async { Err(GeolocationError::Denied) }
    }
}

struct Harness {
    orchestrator: SearchOrchestrator<RecordingPresenter, FixedPosition>,
    surface: Arc<RecordingSurface>,
    presenter: Arc<RecordingPresenter>,
}

fn harness(server: &MockServer, device: Option<(f64, f64)>, available: bool) -> Harness {
    let surface = Arc::new(RecordingSurface::default());
    let presenter = Arc::new(RecordingPresenter::default());
    let client = AssistantClient::new(&server.uri()).unwrap();
    let overlays = OverlayManager::new(surface.clone(), Duration::from_millis(200));
    let orchestrator = SearchOrchestrator::with_shared(
        client,
        overlays,
        presenter.clone(),
        Arc::new(FixedPosition::new(device)),
        2,
        BackendMode {
            available,
            use_llm: false,
        },
    );
    Harness {
        orchestrator,
        surface,
        presenter,
    }
}

fn extract_body(
    location: &str,
    coords: [f64; 2],
    shelters: serde_json::Value,
    intent: &str,
    tool: &str,
) -> serde_json::Value {
    json!({
        "success": true,
        "location": location,
        "coordinates": coords,
        "shelters": shelters,
        "intent": intent,
        "tool_used": tool,
    })
}

fn two_shelters() -> serde_json::Value {
    // Deliberately far-first so ranking has to reorder them.
    json!([
        {"name": "Far Hall", "address": "12 Far St", "lat": 37.60, "lon": 126.99, "capacity": 300},
        {"name": "Near School", "address": "3 Near Ave", "lat": 37.57, "lon": 126.98, "capacity": 150},
    ])
}

fn route_body() -> serde_json::Value {
    json!({
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [126.978, 37.5665]},
                "properties": {"description": "Head north", "totalDistance": 1530.0, "totalTime": 1100.0}
            },
            {
                "type": "Feature",
                "geometry": {"type": "LineString", "coordinates": [[126.978, 37.5665], [126.979, 37.567]]},
                "properties": {}
            },
            {
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [126.979, 37.567]},
                "properties": {"description": "Arrive at the shelter"}
            }
        ]
    })
}

#[tokio::test]
async fn text_search_draws_markers_route_and_indicator() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/location/extract"))
        .respond_with(ResponseTemplate::new(200).set_body_json(extract_body(
            "City Hall",
            [37.5665, 126.978],
            two_shelters(),
            "shelter_location",
            "search_nearest_shelters",
        )))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/directions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(route_body()))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server, None, true);
    h.orchestrator.search_text("shelters near City Hall").await;

    assert_eq!(h.surface.marker_labels(MarkerKind::User), vec!["City Hall"]);
    assert_eq!(
        h.surface.marker_labels(MarkerKind::Shelter),
        vec!["Far Hall", "Near School"]
    );
    assert_eq!(h.surface.marker_labels(MarkerKind::Indicator).len(), 1);
    assert_eq!(h.surface.polyline_count(), 2);

    let state = h.presenter.lock();
    // Ranked nearest-first even though the server sent far-first.
    let (rows, offered) = &state.summaries[0];
    assert!(*offered);
    assert_eq!(rows[0].0, "Near School");
    assert!(rows[0].1.unwrap() < rows[1].1.unwrap());

    let panel = state.route_panels.last().unwrap().as_ref().unwrap();
    assert!((panel.distance_km - 1.53).abs() < 1e-9);
    assert_eq!(panel.duration_minutes, 19);
    assert_eq!(panel.steps.len(), 2);

    assert_eq!(state.controls.as_slice(), &[false, true]);
}

#[tokio::test]
async fn informational_intent_suppresses_directions() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/location/extract"))
        .respond_with(ResponseTemplate::new(200).set_body_json(extract_body(
            "City Hall",
            [37.5665, 126.978],
            two_shelters(),
            "shelter_count",
            "search_nearest_shelters",
        )))
        .mount(&server)
        .await;
    // No directions mock mounted: a request would 404 and fail the test
    // through the absent route panel below.
    Mock::given(method("GET"))
        .and(path("/api/directions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(route_body()))
        .expect(0)
        .mount(&server)
        .await;

    let h = harness(&server, None, true);
    h.orchestrator.search_text("how many shelters nearby").await;

    assert_eq!(h.surface.marker_labels(MarkerKind::Shelter).len(), 2);
    assert!(h.surface.marker_labels(MarkerKind::Indicator).is_empty());
    assert_eq!(h.surface.polyline_count(), 0);

    let state = h.presenter.lock();
    assert!(!state.summaries[0].1);
    // The route panel is explicitly cleared, not just left alone.
    assert_eq!(state.route_panels.as_slice(), &[None]);
    assert_eq!(state.controls.as_slice(), &[false, true]);
}

#[tokio::test]
async fn single_result_suppresses_directions() {
    let server = MockServer::start().await;
    let one = json!([
        {"name": "Only Shelter", "address": "1 Lone Rd", "lat": 37.57, "lon": 126.98, "capacity": 80},
    ]);
    Mock::given(method("POST"))
        .and(path("/api/location/extract"))
        .respond_with(ResponseTemplate::new(200).set_body_json(extract_body(
            "동대문맨션",
            [37.571, 126.979],
            one,
            "shelter_info",
            "search_shelter_by_name",
        )))
        .mount(&server)
        .await;

    let h = harness(&server, None, true);
    h.orchestrator.search_text("동대문맨션 위치").await;

    assert_eq!(
        h.surface.marker_labels(MarkerKind::Shelter),
        vec!["Only Shelter"]
    );
    let state = h.presenter.lock();
    assert!(!state.summaries[0].1);
    assert_eq!(state.route_panels.as_slice(), &[None]);
}

#[tokio::test]
async fn extract_rejection_reports_backend_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/location/extract"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "I could not find that place.",
        })))
        .mount(&server)
        .await;

    let h = harness(&server, None, true);
    h.orchestrator.search_text("asdfghjkl").await;

    assert!(h.surface.marker_labels(MarkerKind::Shelter).is_empty());
    let messages = h.presenter.bot_messages();
    assert!(messages.iter().any(|m| m == "I could not find that place."));
    assert_eq!(h.presenter.last_controls(), Some(true));
}

#[tokio::test]
async fn transport_error_reenables_controls() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/location/extract"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let h = harness(&server, None, true);
    h.orchestrator.search_text("somewhere").await;

    let messages = h.presenter.bot_messages();
    assert!(messages.iter().any(|m| m.contains("try again")));
    assert_eq!(h.presenter.last_controls(), Some(true));
}

#[tokio::test]
async fn local_mode_refuses_text_search() {
    let server = MockServer::start().await;
    let h = harness(&server, None, false);
    h.orchestrator.search_text("shelters near City Hall").await;

    let messages = h.presenter.bot_messages();
    assert!(messages.iter().any(|m| m.contains("unreachable")));
    assert_eq!(h.presenter.last_controls(), Some(true));
    assert_eq!(server.received_requests().await.unwrap().len(), 0);
}

#[tokio::test]
async fn geolocation_search_ranks_and_routes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/shelters/nearest"))
        .and(query_param("lat", "37.5665"))
        .and(query_param("lon", "126.978"))
        .and(query_param("k", "2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"shelters": two_shelters()})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/directions"))
        // Origin is longitude-first toward the routing service.
        .and(query_param("origin", "126.978,37.5665"))
        .respond_with(ResponseTemplate::new(200).set_body_json(route_body()))
        .expect(1)
        .mount(&server)
        .await;

    // Local mode: nearest search still works without the LLM backend.
    let h = harness(&server, Some((37.5665, 126.978)), false);
    h.orchestrator.search_current_location().await;

    assert_eq!(
        h.surface.marker_labels(MarkerKind::User),
        vec!["Current location"]
    );
    let state = h.presenter.lock();
    let (rows, offered) = &state.summaries[0];
    assert!(*offered);
    assert_eq!(rows[0].0, "Near School");
    assert_eq!(state.controls.as_slice(), &[false, true]);
}

#[tokio::test]
async fn geolocation_denial_is_reported() {
    let server = MockServer::start().await;
    let surface = Arc::new(RecordingSurface::default());
    let presenter = Arc::new(RecordingPresenter::default());
    let client = AssistantClient::new(&server.uri()).unwrap();
    let overlays = OverlayManager::new(surface, Duration::from_millis(200));
    let orchestrator = SearchOrchestrator::with_shared(
        client,
        overlays,
        presenter.clone(),
        Arc::new(DeniedPosition),
        2,
        BackendMode {
            available: true,
            use_llm: false,
        },
    );

    orchestrator.search_current_location().await;

    let messages = presenter.bot_messages();
    assert!(messages.iter().any(|m| m.contains("denied")));
    assert_eq!(presenter.last_controls(), Some(true));
}

#[tokio::test]
async fn superseded_failure_stays_silent_while_newer_search_runs() {
    let server = MockServer::start().await;
    // The older search's extract fails, but only after the newer search has
    // started; the newer search is itself still waiting on directions when
    // the failure lands.
    Mock::given(method("POST"))
        .and(path("/api/location/extract"))
        .and(body_partial_json(json!({"query": "slow place"})))
        .respond_with(ResponseTemplate::new(500).set_delay(Duration::from_millis(300)))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/location/extract"))
        .and(body_partial_json(json!({"query": "fast place"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(extract_body(
            "Fast Town",
            [37.5665, 126.978],
            two_shelters(),
            "shelter_location",
            "search_nearest_shelters",
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/directions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(600))
                .set_body_json(route_body()),
        )
        .mount(&server)
        .await;

    let h = harness(&server, None, true);
    let slow = h.orchestrator.clone();
    let slow_task = tokio::spawn(async move { slow.search_text("slow place").await });
    tokio::time::sleep(Duration::from_millis(50)).await;
    h.orchestrator.search_text("fast place").await;
    slow_task.await.unwrap();

    let state = h.presenter.lock();
    // The superseded run's transport error produces no message and no
    // controls change; only the newer run's begin/finish pair touches them.
    assert!(!state
        .messages
        .iter()
        .any(|(_, text)| text.contains("Please try again")));
    assert_eq!(state.controls.as_slice(), &[false, false, true]);
    assert!(state.route_panels.last().unwrap().is_some());
    drop(state);
    assert_eq!(h.surface.marker_labels(MarkerKind::User), vec!["Fast Town"]);
}

#[tokio::test]
async fn newer_search_supersedes_slower_one() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/location/extract"))
        .and(body_partial_json(json!({"query": "slow place"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(extract_body(
                    "Slow Town",
                    [35.0, 128.0],
                    json!([
                        {"name": "Stale Shelter", "address": "9 Old Rd", "lat": 35.01, "lon": 128.01, "capacity": 50},
                        {"name": "Staler Shelter", "address": "10 Old Rd", "lat": 35.02, "lon": 128.02, "capacity": 60},
                    ]),
                    "shelter_location",
                    "search_nearest_shelters",
                )),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/location/extract"))
        .and(body_partial_json(json!({"query": "fast place"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(extract_body(
            "Fast Town",
            [37.5665, 126.978],
            two_shelters(),
            "shelter_location",
            "search_nearest_shelters",
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/directions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(route_body()))
        .mount(&server)
        .await;

    let h = harness(&server, None, true);
    let slow = h.orchestrator.clone();
    let slow_task = tokio::spawn(async move { slow.search_text("slow place").await });
    // Let the slow search reach its extract request before superseding it.
    tokio::time::sleep(Duration::from_millis(50)).await;
    h.orchestrator.search_text("fast place").await;
    slow_task.await.unwrap();

    // Only the newer search's overlays survive.
    assert_eq!(h.surface.marker_labels(MarkerKind::User), vec!["Fast Town"]);
    assert_eq!(
        h.surface.marker_labels(MarkerKind::Shelter),
        vec!["Far Hall", "Near School"]
    );
    let state = h.presenter.lock();
    // The stale run never re-enabled nor disabled controls after the newer
    // run took over: false (slow), false (fast), true (fast finished).
    assert_eq!(state.controls.as_slice(), &[false, false, true]);
    assert!(!state
        .summaries
        .iter()
        .any(|(rows, _)| rows.iter().any(|(name, _)| name.contains("Stale"))));
}
