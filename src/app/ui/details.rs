use eframe::egui::{self, RichText, Ui};

use skill_constellation::engine::{EdgeKind, PinState};

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Selection Details");
        ui.add_space(6.0);

        let Some(selected_id) = self.engine.selected().map(str::to_owned) else {
            ui.label("Select a skill in the graph.");
            return;
        };

        let graph = self.engine.graph();
        let Some(node) = graph.node(&selected_id) else {
            ui.label("Selected skill no longer exists in the graph.");
            return;
        };

        ui.label(RichText::new(node.name()).strong());
        ui.small(node.id());
        ui.add_space(6.0);

        ui.label(format!("Category: {}", node.category()));
        ui.label(format!("Level: {}", node.level()));
        ui.label(format!("Endorsements: {}", node.skill.endorsements));
        match node.skill.last_verified {
            Some(verified) => ui.label(format!("Last verified: {}", verified.format("%Y-%m-%d"))),
            None => ui.label("Last verified: never"),
        };
        ui.label(match node.pin_state {
            PinState::Free => "Position: simulated".to_owned(),
            PinState::Dragging(_) => "Position: dragging".to_owned(),
            PinState::Pinned(at) => format!("Position: pinned at ({:.0}, {:.0})", at.x, at.y),
        });

        let mut accept = false;
        let mut reject = false;
        if node.suggested {
            ui.separator();
            ui.label(RichText::new("Suggested skill").strong());
            if let Some(source) = node.source_node_id.as_deref().and_then(|id| graph.node(id)) {
                ui.label(format!("Because you know {}", source.name()));
            }
            if let Some(rationale) = node.rationale.as_deref().filter(|text| !text.is_empty()) {
                ui.label(rationale);
            }
            ui.horizontal(|ui| {
                accept = ui.button("Accept").clicked();
                reject = ui.button("Reject").clicked();
            });
        }

        ui.separator();
        ui.label(RichText::new("Connected skills").strong());
        let mut neighbors = graph
            .edges()
            .iter()
            .filter_map(|edge| {
                let other = graph.node(edge.other_end(&selected_id)?)?;
                Some((other.id().to_owned(), other.name().to_owned(), edge.kind))
            })
            .collect::<Vec<_>>();
        neighbors.sort_by(|a, b| a.1.cmp(&b.1));

        let mut select = None;
        if neighbors.is_empty() {
            ui.label("No connected skills.");
        } else {
            egui::ScrollArea::vertical()
                .id_salt("connected_skills_scroll")
                .max_height(320.0)
                .auto_shrink([false, true])
                .show(ui, |ui| {
                    for (id, name, kind) in &neighbors {
                        let label = match kind {
                            EdgeKind::Core => name.clone(),
                            EdgeKind::Suggested => format!("{name}  [suggested]"),
                        };
                        if ui.link(label).clicked() {
                            select = Some(id.clone());
                        }
                    }
                });
        }

        if accept && self.engine.accept_suggestion(&selected_id) {
            self.status = Some("Suggestion accepted".to_owned());
        }
        if reject && self.engine.reject_suggestion(&selected_id) {
            self.status = Some("Suggestion rejected".to_owned());
        }
        if let Some(id) = select {
            self.engine.on_node_click(&id);
        }
    }
}
