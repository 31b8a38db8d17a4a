use std::time::Duration;

use eframe::egui::{self, Align2, Color32, FontId, Sense, Shape, Stroke, Ui, vec2};

use skill_constellation::SuggestionOutcome;
use skill_constellation::engine::{EdgeKind, PinState};

use super::super::ViewModel;
use super::super::render_utils::{
    blend_color, category_color, dim_color, draw_background, world_to_screen,
};

impl ViewModel {
    fn update_screen_space(&mut self, rect: egui::Rect) {
        let nodes = self.engine.graph().nodes();
        let scratch = &mut self.view_scratch;

        scratch.screen_positions.clear();
        scratch.screen_radii.clear();
        for node in nodes {
            scratch
                .screen_positions
                .push(world_to_screen(rect, self.pan, self.zoom, node.position));
            scratch
                .screen_radii
                .push((node.radius() * self.zoom).clamp(2.5, 60.0));
        }
    }

    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        draw_background(&painter, rect, self.pan, self.zoom);

        self.handle_graph_zoom(ui, rect, &response);
        self.handle_graph_pan(&response);

        let frame_delta_seconds = ui
            .ctx()
            .input(|input| input.stable_dt)
            .clamp(1.0 / 240.0, 1.0 / 20.0);
        let report = self
            .engine
            .frame(Duration::from_secs_f32(frame_delta_seconds));
        match report.suggestions {
            Some(SuggestionOutcome::Merged { nodes }) => {
                self.status = Some(format!("Added {nodes} suggested skills"));
            }
            Some(SuggestionOutcome::Failed(error)) => {
                self.status = Some(format!("Suggestions failed: {error}"));
            }
            None => {}
        }

        self.update_screen_space(rect);
        Self::visible_indices_into(
            rect,
            &self.view_scratch.screen_positions,
            &self.view_scratch.screen_radii,
            &mut self.view_scratch.visible_indices,
        );

        let hovered_index = Self::hovered_index(
            ui,
            &self.view_scratch.visible_indices,
            &self.view_scratch.screen_positions,
            &self.view_scratch.screen_radii,
        );
        let hovered_id =
            hovered_index.and_then(|index| self.engine.graph().nodes().get(index).map(|node| node.id().to_owned()));

        if self.engine.dragging().is_none() {
            self.engine.on_node_hover(hovered_id.as_deref());
        }
        self.handle_node_drag(ui, rect, &response, hovered_id.as_deref());

        if response.clicked_by(egui::PointerButton::Primary) {
            match hovered_id.as_deref() {
                Some(id) => self.engine.on_node_click(id),
                None => self.engine.clear_selection(),
            }
        }

        if hovered_id.is_some() {
            ui.output_mut(|output| {
                output.cursor_icon = if self.engine.dragging().is_some() {
                    egui::CursorIcon::Grabbing
                } else {
                    egui::CursorIcon::PointingHand
                };
            });
        }

        if !self.engine.is_quiescent() || self.engine.is_generating() || response.dragged() {
            ui.ctx().request_repaint();
        }

        let graph = self.engine.graph();
        let highlighted = self.engine.highlighted();
        let search_matches = self.engine.search_matches();
        let highlight_active = !highlighted.is_empty();
        let search_active = !search_matches.is_empty();
        let selected = self.engine.selected();
        let zoom_sqrt = self.zoom.sqrt();
        let positions = &self.view_scratch.screen_positions;

        for edge in graph.edges() {
            let (Some(src), Some(dst)) = (graph.index_of(&edge.source_id), graph.index_of(&edge.target_id))
            else {
                continue;
            };
            let (start, end) = (positions[src], positions[dst]);
            let is_highlighted =
                highlighted.contains(edge.source_id.as_str()) && highlighted.contains(edge.target_id.as_str());

            let width = (edge.strength * 1.8 * zoom_sqrt).clamp(0.6, 3.4)
                + if is_highlighted { 0.9 } else { 0.0 };
            let color = if is_highlighted {
                Color32::from_rgb(241, 146, 94)
            } else if highlight_active {
                Color32::from_rgba_unmultiplied(80, 90, 104, 110)
            } else {
                Color32::from_rgba_unmultiplied(110, 118, 128, 190)
            };
            let stroke = Stroke::new(width, color);

            match edge.kind {
                EdgeKind::Core => {
                    painter.line_segment([start, end], stroke);
                }
                EdgeKind::Suggested => {
                    painter.extend(Shape::dashed_line(&[start, end], stroke, 6.0, 4.0));
                }
            }
        }

        for &index in &self.view_scratch.visible_indices {
            let node = &graph.nodes()[index];
            let position = positions[index];
            let radius = self.view_scratch.screen_radii[index];
            let id = node.id();

            let is_selected = selected == Some(id);
            let is_hovered = hovered_id.as_deref() == Some(id);
            let is_highlighted = highlighted.contains(id);
            let is_search_match = search_matches.contains(id);

            let base_color = category_color(node.category());
            let color = if is_hovered {
                Color32::from_rgb(255, 164, 101)
            } else if is_highlighted {
                blend_color(base_color, Color32::from_rgb(246, 137, 92), 0.45)
            } else if is_search_match {
                blend_color(base_color, Color32::from_rgb(103, 196, 255), 0.68)
            } else if highlight_active {
                dim_color(base_color, 0.52)
            } else if search_active {
                dim_color(base_color, 0.38)
            } else {
                base_color
            };

            if node.suggested {
                painter.circle_filled(position, radius, color.gamma_multiply(0.35));
                painter.extend(Shape::dashed_line(
                    &circle_outline(position, radius, 18),
                    Stroke::new(1.4, color),
                    4.0,
                    3.0,
                ));
            } else {
                painter.circle_filled(position, radius, color);
                painter.circle_stroke(
                    position,
                    radius,
                    Stroke::new(1.0, Color32::from_rgba_unmultiplied(15, 15, 15, 190)),
                );
            }

            if matches!(node.pin_state, PinState::Pinned(_)) {
                painter.circle_stroke(
                    position,
                    radius + 3.0,
                    Stroke::new(1.2, Color32::from_rgba_unmultiplied(230, 230, 230, 150)),
                );
            }
            if is_selected {
                painter.circle_stroke(
                    position,
                    radius + 5.0,
                    Stroke::new(2.0, Color32::from_rgb(245, 206, 93)),
                );
            }

            let should_draw_label = self.show_labels
                || is_selected
                || is_hovered
                || is_highlighted
                || is_search_match
                || self.zoom > 1.35;
            if should_draw_label {
                painter.text(
                    position + vec2(radius + 5.0, 0.0),
                    Align2::LEFT_CENTER,
                    node.name(),
                    FontId::proportional(12.0),
                    Color32::from_gray(238),
                );
            }
        }

        if let Some(node) = hovered_id.as_deref().and_then(|id| graph.node(id)) {
            let mut panel_text = format!(
                "{}  |  {}  |  level {}",
                node.name(),
                node.category(),
                node.level()
            );
            if node.suggested {
                panel_text.push_str("  |  suggested");
            }
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                panel_text,
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }
    }
}

fn circle_outline(center: egui::Pos2, radius: f32, segments: usize) -> Vec<egui::Pos2> {
    (0..=segments)
        .map(|step| {
            let angle = step as f32 / segments as f32 * std::f32::consts::TAU;
            center + vec2(angle.cos(), angle.sin()) * radius
        })
        .collect()
}
