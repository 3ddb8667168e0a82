use egui::Context;

use crate::controller::{InputState, Walkthrough};

pub const HINT_TEXT: &str = "Press E to interact";

/// Build the complete HUD and return egui output
pub fn build_ui(
    egui_ctx: &Context,
    raw_input: egui::RawInput,
    walk: &Walkthrough,
    input: &InputState,
    draw_hint: bool,
    dt: f32,
) -> egui::FullOutput {
    egui_ctx.run(raw_input, |ctx| draw_hud(ctx, walk, input, draw_hint, dt))
}

/// Crosshair, optional interaction hint and the status window.
fn draw_hud(ctx: &Context, walk: &Walkthrough, input: &InputState, draw_hint: bool, dt: f32) {
    if input.pointer_locked {
        draw_crosshair(ctx);
    } else {
        draw_click_prompt(ctx);
    }
    if draw_hint && walk.hint_visible {
        draw_hint_overlay(ctx);
    }
    draw_status_window(ctx, walk, input, dt);
}

fn draw_crosshair(ctx: &Context) {
    let painter = ctx.layer_painter(egui::LayerId::new(egui::Order::TOP, egui::Id::new("crosshair")));
    let center = ctx.available_rect().center();
    let size = 8.0;
    let stroke = egui::Stroke::new(1.0, egui::Color32::WHITE);
    painter.line_segment([egui::pos2(center.x - size, center.y), egui::pos2(center.x + size, center.y)], stroke);
    painter.line_segment([egui::pos2(center.x, center.y - size), egui::pos2(center.x, center.y + size)], stroke);
}

fn draw_click_prompt(ctx: &Context) {
    egui::Area::new(egui::Id::new("click_prompt"))
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.label(egui::RichText::new("Click to look around").color(egui::Color32::WHITE));
        });
}

fn draw_hint_overlay(ctx: &Context) {
    egui::Area::new(egui::Id::new("interaction_hint"))
        .anchor(egui::Align2::CENTER_BOTTOM, [0.0, -48.0])
        .show(ctx, |ui| {
            egui::Frame::NONE
                .fill(egui::Color32::from_black_alpha(160))
                .inner_margin(8.0)
                .corner_radius(4.0)
                .show(ui, |ui| {
                    ui.label(egui::RichText::new(HINT_TEXT).size(16.0).color(egui::Color32::WHITE));
                });
        });
}

fn draw_status_window(ctx: &Context, walk: &Walkthrough, input: &InputState, dt: f32) {
    let eye = walk.camera.eye;
    let on_off = |b: bool| if b { "on" } else { "off" };

    egui::Window::new("Walkthrough")
        .default_pos([8.0, 8.0])
        .show(ctx, |ui| {
            ui.label(egui::RichText::new(format!("FPS: {:.0}", if dt > 0.0 { 1.0 / dt } else { 0.0 })).small());
            ui.label(egui::RichText::new(format!("Pos: x: {:.2} y: {:.2} z: {:.2}", eye.x, eye.y, eye.z)).small());
            ui.label(
                egui::RichText::new(format!("Yaw: {:.0} Pitch: {:.0}", walk.camera.yaw.to_degrees(), walk.camera.pitch.to_degrees()))
                    .small(),
            );
            if !walk.scene_loaded {
                ui.label(egui::RichText::new("Scene not loaded").small().color(egui::Color32::YELLOW));
            }
            ui.separator();
            ui.label(egui::RichText::new(format!("Monitor: {}", on_off(walk.state.monitor_on))).small());
            ui.label(egui::RichText::new(format!("Lights: {}", on_off(walk.state.light_on))).small());
            let door = walk.door_angle().map_or("-".to_string(), |a| format!("{:.0}°", a.to_degrees()));
            ui.label(
                egui::RichText::new(format!("Door: {} ({door})", if walk.state.door_open { "open" } else { "closed" })).small(),
            );
            ui.label(egui::RichText::new(format!("Colliders: {} Triggers: {}", walk.colliders.len(), walk.triggers.len())).small());
            ui.separator();
            ui.label(egui::RichText::new("Controls:").small());
            ui.label(egui::RichText::new("Click - Lock mouse").small());
            ui.label(egui::RichText::new("WASD - Move").small());
            ui.label(egui::RichText::new("E - Interact").small());
            ui.label(egui::RichText::new(format!("B - Debug boxes ({})", on_off(input.show_debug_boxes))).small());
            ui.label(egui::RichText::new("Esc - Release mouse").small());
        });
}
