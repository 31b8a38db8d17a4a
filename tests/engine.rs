use std::f32::consts::PI;
use std::sync::Arc;
use std::time::Duration;

use skill_constellation::engine::{CatalogProvider, Category, PinState, skill_radius};
use skill_constellation::{EngineConfig, Skill, SkillGraphEngine, parse_skills};

fn engine() -> SkillGraphEngine {
    let mut config = EngineConfig::default();
    config.suggestions.seed = Some(7);
    SkillGraphEngine::new(config, Arc::new(CatalogProvider::new()))
}

fn sample_skills() -> Vec<Skill> {
    parse_skills(include_str!("../data/skills.json")).expect("sample data parses")
}

fn settle(engine: &mut SkillGraphEngine) {
    for _ in 0..5_000 {
        if engine.is_quiescent() {
            return;
        }
        engine.tick();
    }
    panic!("simulation did not cool down");
}

#[test]
fn react_is_a_frontend_skill_with_radius_18() {
    let mut engine = engine();
    engine.load(&[Skill::new("1", "React", 80)]);

    let node = engine.graph().node("1").expect("node loaded");
    assert_eq!(node.category(), Category::Frontend);
    assert_eq!(node.radius(), 18.0);
}

#[test]
fn unmatched_names_fall_into_a_level_bucket() {
    let mut engine = engine();
    engine.load(&[Skill::new("2", "Unknown Widgetry", 40)]);

    let node = engine.graph().node("2").expect("node loaded");
    assert_eq!(node.category(), Category::Beginner);
}

#[test]
fn two_categories_get_opposite_anchors() {
    let mut engine = engine();
    engine.load(&[Skill::new("1", "React", 80), Skill::new("2", "PostgreSQL", 60)]);

    let react = engine.graph().node("1").expect("node loaded").cluster_anchor;
    let postgres = engine.graph().node("2").expect("node loaded").cluster_anchor;

    assert!((react.length() - 250.0).abs() < 1e-3);
    assert!((postgres.length() - 250.0).abs() < 1e-3);
    assert!(((react.angle() - postgres.angle()).abs() - PI).abs() < 1e-3);
}

#[test]
fn categories_do_not_depend_on_input_order() {
    let skills = sample_skills();
    let mut reversed = skills.clone();
    reversed.reverse();

    let mut forward_engine = engine();
    forward_engine.load(&skills);
    let mut reverse_engine = engine();
    reverse_engine.load(&reversed);

    assert_eq!(forward_engine.graph().len(), skills.len());
    for node in forward_engine.graph().nodes() {
        let other = reverse_engine.graph().node(node.id()).expect("same ids");
        assert_eq!(node.category(), other.category());
        assert_eq!(node.radius(), skill_radius(node.level()));
    }
}

#[test]
fn settled_layout_has_no_overlapping_nodes() {
    let mut engine = engine();
    engine.load(&sample_skills());
    engine.start();

    settle(&mut engine);

    let nodes = engine.graph().nodes();
    for (offset, a) in nodes.iter().enumerate() {
        for b in &nodes[offset + 1..] {
            let distance = (a.position - b.position).length();
            assert!(
                distance >= a.radius() + b.radius() - 1.0,
                "{} and {} are {distance} apart",
                a.name(),
                b.name()
            );
        }
    }
}

#[test]
fn released_core_skill_is_pinned_and_reanchored() {
    let mut engine = engine();
    engine.load(&sample_skills());
    engine.start();

    assert!(engine.on_drag_start("1"));
    assert!(engine.on_drag("1", 120.0, -80.0));
    assert!(engine.on_drag_end("1"));

    let node = engine.graph().node("1").expect("node loaded");
    let target = node.position;
    assert_eq!(node.pin_state, PinState::Pinned(target));
    assert_eq!(node.cluster_anchor, target);
    assert_eq!((target.x, target.y), (120.0, -80.0));

    for _ in 0..100 {
        engine.tick();
    }
    assert_eq!(engine.graph().node("1").map(|node| node.position), Some(target));
}

#[test]
fn stopping_freezes_positions() {
    let mut engine = engine();
    engine.load(&sample_skills());
    engine.start();
    for _ in 0..10 {
        engine.frame(Duration::from_millis(16));
    }

    engine.stop();
    let before = engine.snapshot();
    assert!(!before.running);

    for _ in 0..50 {
        engine.frame(Duration::from_secs(1));
    }
    engine.tick();

    let after = engine.snapshot();
    let positions = |snapshot: &skill_constellation::GraphSnapshot| {
        snapshot
            .nodes
            .iter()
            .map(|node| (node.position.x, node.position.y))
            .collect::<Vec<_>>()
    };
    assert_eq!(positions(&before), positions(&after));
    assert_eq!(before.alpha, after.alpha);
}

#[test]
fn frames_advance_the_simulation_while_running() {
    let mut engine = engine();
    engine.load(&sample_skills());
    engine.start();

    let report = engine.frame(Duration::from_millis(60));

    assert_eq!(report.ticks, 3);
    assert!(engine.alpha() < 1.0);
}

#[test]
fn reload_resets_pins_and_interaction() {
    let mut engine = engine();
    let skills = sample_skills();
    engine.load(&skills);
    engine.start();
    engine.on_node_click("2");
    engine.on_drag_start("1");
    engine.on_drag("1", 10.0, 10.0);
    engine.on_drag_end("1");

    let summary = engine.reload(&skills);

    assert_eq!(summary.loaded, skills.len());
    assert_eq!(engine.selected(), None);
    assert_eq!(engine.dragging(), None);
    assert!(engine.graph().nodes().iter().all(|node| node.pin_state.is_free()));
    assert_eq!(engine.revision(), 2);
}

#[test]
fn hover_highlights_neighbors_and_search_filters_names() {
    let mut engine = engine();
    engine.load(&[
        Skill::new("1", "React", 80),
        Skill::new("2", "TypeScript", 70),
        Skill::new("3", "PostgreSQL", 60),
    ]);

    engine.on_node_hover(Some("1"));
    let highlighted = engine.highlighted();
    assert!(highlighted.contains("1"));
    assert!(highlighted.contains("2"));
    assert!(!highlighted.contains("3"));

    engine.set_search("typscr");
    assert_eq!(engine.search_matches().into_iter().collect::<Vec<_>>(), ["2"]);
}
