use eframe::egui::{self, Pos2, Rect, Ui};

use super::super::ViewModel;
use super::super::render_utils::{circle_visible, screen_to_world};

impl ViewModel {
    pub(in crate::app) fn handle_graph_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let world_before = screen_to_world(rect, self.pan, self.zoom, pointer);

        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.zoom = (self.zoom * zoom_factor).clamp(0.2, 5.0);
        self.pan = pointer - rect.center() - (world_before * self.zoom);
    }

    pub(in crate::app) fn handle_graph_pan(&mut self, response: &egui::Response) {
        if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.pan += response.drag_delta();
        }
    }

    /// Primary-button drags move nodes through the engine's drag contract.
    pub(in crate::app) fn handle_node_drag(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
        hovered: Option<&str>,
    ) {
        if response.drag_started_by(egui::PointerButton::Primary)
            && let Some(id) = hovered
        {
            self.engine.on_drag_start(id);
        }

        let Some(dragging) = self.engine.dragging().map(str::to_owned) else {
            return;
        };

        if response.dragged_by(egui::PointerButton::Primary)
            && let Some(pointer) = ui.input(|input| input.pointer.interact_pos())
        {
            let world = screen_to_world(rect, self.pan, self.zoom, pointer);
            self.engine.on_drag(&dragging, world.x, world.y);
        }

        if response.drag_stopped() || !ui.input(|input| input.pointer.primary_down()) {
            self.engine.on_drag_end(&dragging);
        }
    }

    pub(in crate::app) fn visible_indices_into(
        rect: Rect,
        screen_positions: &[Pos2],
        screen_radii: &[f32],
        visible: &mut Vec<usize>,
    ) {
        visible.clear();
        visible.extend(
            (0..screen_positions.len())
                .filter(|&index| circle_visible(rect, screen_positions[index], screen_radii[index])),
        );
    }

    pub(in crate::app) fn hovered_index(
        ui: &Ui,
        visible_indices: &[usize],
        screen_positions: &[Pos2],
        screen_radii: &[f32],
    ) -> Option<usize> {
        let pointer_pos = ui.input(|input| input.pointer.hover_pos());
        pointer_pos.and_then(|pointer| {
            visible_indices
                .iter()
                .filter_map(|index| {
                    let distance = screen_positions[*index].distance(pointer);
                    (distance <= screen_radii[*index]).then_some((*index, distance))
                })
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .map(|(index, _)| index)
        })
    }
}
