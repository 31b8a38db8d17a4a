use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::anyhow;
use skill_constellation::engine::{
    EdgeKind, PinState, SuggestionCandidate, SuggestionProvider, skill_radius,
};
use skill_constellation::{
    EngineConfig, Skill, SkillGraphEngine, SuggestionError, SuggestionOutcome,
};

fn skills() -> Vec<Skill> {
    vec![
        Skill::new("1", "React", 80),
        Skill::new("2", "PostgreSQL", 60),
        Skill::new("3", "Docker", 70),
        Skill::new("4", "Figma", 50),
    ]
}

fn engine_with(provider: Arc<dyn SuggestionProvider>, config: EngineConfig) -> SkillGraphEngine {
    let mut engine = SkillGraphEngine::new(config, provider);
    engine.load(&skills());
    engine.start();
    engine
}

fn seeded_config() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.suggestions.seed = Some(42);
    config
}

fn overlapping_provider() -> Arc<dyn SuggestionProvider> {
    Arc::new(
        |name: &str, _category: &str| -> anyhow::Result<Vec<SuggestionCandidate>> {
            Ok(vec![
                SuggestionCandidate::new("Shared Skill", 40, "useful everywhere"),
                SuggestionCandidate::new("SHARED skill", 40, "same skill, other casing"),
                SuggestionCandidate::new("react", 60, "already known"),
                SuggestionCandidate::new(format!("{name} Internals"), 55, "go deeper"),
            ])
        },
    )
}

fn slow_provider(delay: Duration) -> Arc<dyn SuggestionProvider> {
    Arc::new(
        move |name: &str, _category: &str| -> anyhow::Result<Vec<SuggestionCandidate>> {
            thread::sleep(delay);
            Ok(vec![SuggestionCandidate::new(format!("{name} Next"), 30, "")])
        },
    )
}

fn wait_for_outcome(engine: &mut SkillGraphEngine) -> SuggestionOutcome {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if let Some(outcome) = engine.frame(Duration::from_millis(16)).suggestions {
            return outcome;
        }
        thread::sleep(Duration::from_millis(5));
    }
    panic!("no suggestion outcome within the deadline");
}

fn idle_frames(engine: &mut SkillGraphEngine, wall_time: Duration) -> Vec<SuggestionOutcome> {
    let deadline = Instant::now() + wall_time;
    let mut outcomes = Vec::new();
    while Instant::now() < deadline {
        outcomes.extend(engine.frame(Duration::from_millis(16)).suggestions);
        thread::sleep(Duration::from_millis(5));
    }
    outcomes
}

fn graph_signature(engine: &SkillGraphEngine) -> (Vec<String>, usize) {
    let ids = engine
        .graph()
        .nodes()
        .iter()
        .map(|node| node.id().to_owned())
        .collect();
    (ids, engine.graph().edges().len())
}

#[test]
fn merged_suggestions_have_unique_names_and_one_edge_each() {
    let mut engine = engine_with(overlapping_provider(), seeded_config());

    engine.request_suggestions().expect("request starts");
    let outcome = wait_for_outcome(&mut engine);

    let graph = engine.graph();
    let added = graph.nodes().iter().filter(|node| node.suggested).count();
    assert_eq!(outcome, SuggestionOutcome::Merged { nodes: added });
    // One shared skill plus one "<seed> Internals" per seed.
    assert_eq!(added, 1 + 3);

    let mut names = HashSet::new();
    for node in graph.nodes() {
        assert!(names.insert(node.name().to_lowercase()), "duplicate {}", node.name());
    }

    for node in graph.nodes().iter().filter(|node| node.suggested) {
        let source = node.source_node_id.as_deref().expect("suggestions know their seed");
        let edges = graph
            .edges()
            .iter()
            .filter(|edge| edge.kind == EdgeKind::Suggested && edge.touches(node.id()))
            .collect::<Vec<_>>();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].other_end(node.id()), Some(source));
        assert!(!graph.node(source).expect("seed exists").suggested);
        assert!(node.radius() < skill_radius(0));
        assert_eq!(node.cluster_anchor, graph.node(source).map(|seed| seed.cluster_anchor).unwrap_or_default());
    }
    assert!(engine.alpha() >= engine.config().physics.suggestion_alpha * 0.9);
}

#[test]
fn provider_failure_leaves_the_graph_untouched() {
    let provider: Arc<dyn SuggestionProvider> = Arc::new(
        |_: &str, _: &str| -> anyhow::Result<Vec<SuggestionCandidate>> {
            Err(anyhow!("recommendation service unavailable"))
        },
    );
    let mut engine = engine_with(provider, seeded_config());
    let before = graph_signature(&engine);

    engine.request_suggestions().expect("request starts");
    let outcome = wait_for_outcome(&mut engine);

    assert_eq!(
        outcome,
        SuggestionOutcome::Failed(SuggestionError::Provider(
            "recommendation service unavailable".to_owned()
        ))
    );
    assert_eq!(graph_signature(&engine), before);
    assert!(!engine.is_generating());
    assert!(engine.request_suggestions().is_ok());
}

#[test]
fn empty_results_are_reported_as_failures() {
    let provider: Arc<dyn SuggestionProvider> = Arc::new(
        |_: &str, _: &str| -> anyhow::Result<Vec<SuggestionCandidate>> { Ok(Vec::new()) },
    );
    let mut engine = engine_with(provider, seeded_config());
    let before = graph_signature(&engine);

    engine.request_suggestions().expect("request starts");

    assert_eq!(
        wait_for_outcome(&mut engine),
        SuggestionOutcome::Failed(SuggestionError::Empty)
    );
    assert_eq!(graph_signature(&engine), before);
}

#[test]
fn only_one_request_runs_at_a_time() {
    let mut engine = engine_with(slow_provider(Duration::from_millis(50)), seeded_config());

    engine.request_suggestions().expect("request starts");

    assert_eq!(engine.request_suggestions(), Err(SuggestionError::AlreadyPending));
}

#[test]
fn cancelled_requests_never_merge() {
    let mut engine = engine_with(slow_provider(Duration::from_millis(60)), seeded_config());
    let before = graph_signature(&engine);

    engine.request_suggestions().expect("request starts");
    engine.cancel_suggestions();

    assert!(!engine.is_generating());
    assert!(idle_frames(&mut engine, Duration::from_millis(400)).is_empty());
    assert_eq!(graph_signature(&engine), before);
}

#[test]
fn shutdown_abandons_outstanding_requests() {
    let mut engine = engine_with(slow_provider(Duration::from_millis(60)), seeded_config());
    let before = graph_signature(&engine);

    engine.request_suggestions().expect("request starts");
    engine.shutdown();
    thread::sleep(Duration::from_millis(300));

    assert!(idle_frames(&mut engine, Duration::from_millis(50)).is_empty());
    assert_eq!(graph_signature(&engine), before);
    assert!(!engine.is_active());
}

#[test]
fn reload_discards_requests_for_the_previous_graph() {
    let mut engine = engine_with(slow_provider(Duration::from_millis(60)), seeded_config());

    engine.request_suggestions().expect("request starts");
    engine.reload(&skills());

    assert!(!engine.is_generating());
    assert!(idle_frames(&mut engine, Duration::from_millis(400)).is_empty());
    assert!(engine.graph().nodes().iter().all(|node| !node.suggested));
}

#[test]
fn slow_providers_time_out() {
    let mut config = seeded_config();
    config.suggestions.timeout_ms = 50;
    let mut engine = engine_with(slow_provider(Duration::from_millis(500)), config);
    let before = graph_signature(&engine);

    engine.request_suggestions().expect("request starts");

    assert_eq!(
        wait_for_outcome(&mut engine),
        SuggestionOutcome::Failed(SuggestionError::TimedOut(Duration::from_millis(50)))
    );
    assert_eq!(graph_signature(&engine), before);
}

#[test]
fn stopped_engines_hold_results_until_resumed() {
    let mut engine = engine_with(overlapping_provider(), seeded_config());
    let before = graph_signature(&engine);

    engine.request_suggestions().expect("request starts");
    engine.stop();
    thread::sleep(Duration::from_millis(200));
    assert!(idle_frames(&mut engine, Duration::from_millis(50)).is_empty());
    assert_eq!(graph_signature(&engine), before);

    engine.start();
    assert!(matches!(
        wait_for_outcome(&mut engine),
        SuggestionOutcome::Merged { .. }
    ));
}

#[test]
fn accepting_promotes_and_rejecting_removes() {
    let mut engine = engine_with(overlapping_provider(), seeded_config());
    engine.request_suggestions().expect("request starts");
    wait_for_outcome(&mut engine);

    let suggested = engine
        .graph()
        .nodes()
        .iter()
        .filter(|node| node.suggested)
        .map(|node| node.id().to_owned())
        .collect::<Vec<_>>();
    let (accepted, rejected) = (&suggested[0], &suggested[1]);

    engine.on_node_click(rejected);
    assert!(engine.accept_suggestion(accepted));
    assert!(engine.reject_suggestion(rejected));
    assert!(!engine.accept_suggestion(accepted));
    assert!(!engine.reject_suggestion("1"));

    let graph = engine.graph();
    let node = graph.node(accepted).expect("accepted node stays");
    assert!(!node.suggested);
    assert_eq!(node.source_node_id, None);
    assert_eq!(node.radius(), skill_radius(node.level()));
    assert!(
        graph
            .edges()
            .iter()
            .filter(|edge| edge.touches(accepted))
            .all(|edge| edge.kind == EdgeKind::Core)
    );

    assert!(graph.node(rejected).is_none());
    assert!(graph.edges().iter().all(|edge| !edge.touches(rejected)));
    assert_eq!(engine.selected(), None);
}

#[test]
fn released_suggestions_rejoin_the_simulation() {
    let mut engine = engine_with(overlapping_provider(), seeded_config());
    engine.request_suggestions().expect("request starts");
    wait_for_outcome(&mut engine);

    let id = engine
        .graph()
        .nodes()
        .iter()
        .find(|node| node.suggested)
        .map(|node| node.id().to_owned())
        .expect("a suggestion was merged");

    assert!(engine.on_drag_start(&id));
    assert!(engine.on_drag(&id, 400.0, 400.0));
    assert!(engine.on_drag_end(&id));

    let node = engine.graph().node(&id).expect("node exists");
    assert_eq!(node.pin_state, PinState::Free);
    let released_at = node.position;

    for _ in 0..20 {
        engine.tick();
    }
    assert_ne!(engine.graph().node(&id).map(|node| node.position), Some(released_at));
}

#[test]
fn rejecting_a_dragged_suggestion_lets_the_simulation_cool() {
    let mut engine = engine_with(overlapping_provider(), seeded_config());
    engine.request_suggestions().expect("request starts");
    wait_for_outcome(&mut engine);

    let id = engine
        .graph()
        .nodes()
        .iter()
        .find(|node| node.suggested)
        .map(|node| node.id().to_owned())
        .expect("a suggestion was merged");

    assert!(engine.on_drag_start(&id));
    assert!(engine.reject_suggestion(&id));
    assert_eq!(engine.dragging(), None);

    for _ in 0..5_000 {
        if engine.is_quiescent() {
            break;
        }
        engine.tick();
    }
    assert!(engine.is_quiescent(), "alpha stuck at {}", engine.alpha());
}
