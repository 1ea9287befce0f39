use eframe::egui;
use city_canvas_core::controller::{self, Controller, PanDirection, RepeatAction, ZoomDirection};
use city_canvas_core::model::{CitySize, UNITS};
use city_canvas_core::store::{MapStore, PERSIST_KEYS};
use city_canvas_core::views::{grid, minimap, scale_bar};
use city_canvas_protocol::Viewport;

use crate::renderer;
use crate::theme::ThemeMode;

const CANVAS_MARGIN: f64 = 16.0;
/// Hit-zone thickness for the minimap resize handles, px.
const HANDLE_GRAB: f32 = 8.0;

/// Main application state.
pub struct CityApp {
    store: MapStore,
    controller: Controller,
    theme_mode: ThemeMode,
    settings_open: bool,
    build_mode: bool,
    /// Canvas pixel size from the previous frame, used by toolbar
    /// actions that run before the central panel lays out.
    canvas_size: (f64, f64),
    fit_applied: bool,
    /// Settings panel scratch values, committed on change.
    city_input: (f64, f64),
    error: Option<String>,
}

impl CityApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::light());

        let mut store = MapStore::new();
        let mut error = None;
        if let Some(storage) = cc.storage {
            for key in PERSIST_KEYS {
                let Some(json) = storage.get_string(key) else {
                    continue;
                };
                // A stale or corrupt value falls back to the default.
                if let Err(e) = store.apply_persisted(key, &json) {
                    error = Some(format!("Ignored saved `{key}`: {e}"));
                }
            }
        }

        let city = store.city_size();
        Self {
            store,
            controller: Controller::new(),
            theme_mode: ThemeMode::Light,
            settings_open: false,
            build_mode: false,
            canvas_size: (1000.0, 800.0),
            fit_applied: false,
            city_input: (city.x, city.y),
            error,
        }
    }

    fn toolbar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("🗺 city-canvas");
                ui.separator();

                if ui
                    .selectable_label(self.settings_open, "⚙ Settings")
                    .clicked()
                {
                    self.settings_open = !self.settings_open;
                }

                let unit = self.store.unit();
                if ui
                    .button(format!("Unit: {}", unit.label))
                    .on_hover_text("Convert the city to the other measurement system")
                    .clicked()
                {
                    let (vw, vh) = self.canvas_size;
                    self.store.toggle_unit(vw, vh);
                    let city = self.store.city_size();
                    self.city_input = (city.x, city.y);
                }

                if ui
                    .selectable_label(self.build_mode, "✏ Build")
                    .clicked()
                {
                    self.build_mode = !self.build_mode;
                }

                ui.separator();

                let theme_label = match self.theme_mode {
                    ThemeMode::Dark => "🌙 Dark",
                    ThemeMode::Light => "☀ Light",
                };
                if ui.button(theme_label).clicked() {
                    self.theme_mode = match self.theme_mode {
                        ThemeMode::Dark => {
                            ctx.set_visuals(egui::Visuals::light());
                            ThemeMode::Light
                        }
                        ThemeMode::Light => {
                            ctx.set_visuals(egui::Visuals::dark());
                            ThemeMode::Dark
                        }
                    };
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(format!("Zoom: {:.2}x", self.store.view().zoom));
                });
            });
        });
    }

    fn status_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if let Some(err) = &self.error {
                    ui.colored_label(egui::Color32::RED, err);
                } else {
                    let city = self.store.city_size();
                    let unit = self.store.unit();
                    let bar = scale_bar::select(self.store.view().zoom, unit);
                    ui.label(format!(
                        "City: {} × {} {} | Scale: {}",
                        city.x, city.y, unit.short, bar.label,
                    ));
                }
            });
        });
    }

    fn settings_window(&mut self, ctx: &egui::Context) {
        if !self.settings_open {
            return;
        }
        let (vw, vh) = self.canvas_size;
        let mut open = true;
        egui::Window::new("Settings")
            .open(&mut open)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label("City size");
                let mut changed = false;
                ui.horizontal(|ui| {
                    changed |= ui
                        .add(
                            egui::DragValue::new(&mut self.city_input.0)
                                .speed(0.5)
                                .range(0.01..=10_000.0),
                        )
                        .changed();
                    ui.label("×");
                    changed |= ui
                        .add(
                            egui::DragValue::new(&mut self.city_input.1)
                                .speed(0.5)
                                .range(0.01..=10_000.0),
                        )
                        .changed();
                    ui.label(self.store.unit().label);
                });
                if changed {
                    self.store.set_city_size(
                        CitySize::new(self.city_input.0, self.city_input.1),
                        vw,
                        vh,
                    );
                }

                ui.separator();
                let next = UNITS[(self.store.state().unit_index + 1) % UNITS.len()].label;
                if ui.button(format!("Switch to {next}")).clicked() {
                    self.store.toggle_unit(vw, vh);
                    let city = self.store.city_size();
                    self.city_input = (city.x, city.y);
                }
            });
        if !open {
            self.settings_open = false;
        }
    }

    /// On-screen arrow pad, zoom buttons, and the zoom slider. Buttons
    /// step once on press and repeat while held.
    fn control_cluster(&mut self, ui: &mut egui::Ui, canvas: egui::Rect) {
        let (vw, vh) = self.canvas_size;
        let now = ui.input(|i| i.time);
        let mut any_held = false;

        let anchor = egui::pos2(
            canvas.right() - 120.0,
            canvas.top() + CANVAS_MARGIN as f32,
        );
        let builder = egui::UiBuilder::new()
            .max_rect(egui::Rect::from_min_size(anchor, egui::vec2(110.0, 150.0)));
        ui.scope_builder(builder, |ui| {
            let mut hold = |ui: &mut egui::Ui, label: &str, action: RepeatAction| {
                let resp = ui.button(label);
                if resp.is_pointer_button_down_on() {
                    any_held = true;
                    if self.controller.repeat_active() {
                        self.controller.tick(&mut self.store, now, vw, vh);
                    } else {
                        match action {
                            RepeatAction::Pan(dir) => {
                                controller::pan_step(&mut self.store, dir, vw, vh);
                            }
                            RepeatAction::Zoom(dir) => {
                                controller::zoom_step(&mut self.store, dir, vw, vh);
                            }
                        }
                        self.controller.start_repeat(action, now);
                    }
                }
            };

            ui.vertical_centered(|ui| {
                hold(ui, "⬆", RepeatAction::Pan(PanDirection::Up));
                ui.horizontal(|ui| {
                    hold(ui, "⬅", RepeatAction::Pan(PanDirection::Left));
                    hold(ui, "➡", RepeatAction::Pan(PanDirection::Right));
                });
                hold(ui, "⬇", RepeatAction::Pan(PanDirection::Down));
                ui.horizontal(|ui| {
                    hold(ui, "➕", RepeatAction::Zoom(ZoomDirection::In));
                    hold(ui, "➖", RepeatAction::Zoom(ZoomDirection::Out));
                });
            });

            let mut t = controller::slider_value(&self.store, vw, vh);
            let slider = ui.add(
                egui::Slider::new(&mut t, 0.0..=1.0)
                    .show_value(false)
                    .text("zoom"),
            );
            if slider.changed() {
                controller::apply_slider(&mut self.store, t, vw, vh);
            }
        });

        if !any_held && self.controller.repeat_active() {
            self.controller.stop_repeat();
        }
        if self.controller.repeat_active() {
            ui.ctx().request_repaint();
        }
    }

    fn canvas(&mut self, ui: &mut egui::Ui) {
        let canvas = ui.available_rect_before_wrap();
        let size = (f64::from(canvas.width()), f64::from(canvas.height()));
        if size != self.canvas_size || !self.fit_applied {
            self.canvas_size = size;
            self.fit_applied = true;
            self.store.ensure_fit(size.0, size.1);
        }
        let (vw, vh) = self.canvas_size;

        // Minimap panel position, bottom-right.
        let geom = minimap::geometry(
            self.store.city_size(),
            self.store.unit(),
            self.store.minimap_max_size(),
        );
        let mini_origin = egui::pos2(
            canvas.right() - CANVAS_MARGIN as f32 - geom.width as f32,
            canvas.bottom() - CANVAS_MARGIN as f32 - geom.height as f32,
        );
        let mini_rect = egui::Rect::from_min_size(
            mini_origin,
            egui::vec2(geom.width as f32, geom.height as f32),
        );
        let left_handle = egui::Rect::from_min_max(
            egui::pos2(mini_rect.left() - HANDLE_GRAB / 2.0, mini_rect.top()),
            egui::pos2(mini_rect.left() + HANDLE_GRAB, mini_rect.bottom()),
        );
        let top_handle = egui::Rect::from_min_max(
            egui::pos2(mini_rect.left(), mini_rect.top() - HANDLE_GRAB / 2.0),
            egui::pos2(mini_rect.right(), mini_rect.top() + HANDLE_GRAB),
        );

        let response = ui.allocate_rect(canvas, egui::Sense::click_and_drag());

        if response.drag_started() {
            if let Some(pos) = response.interact_pointer_pos() {
                if left_handle.contains(pos) {
                    self.controller.begin_minimap_resize(
                        &self.store,
                        controller::ResizeAxis::Horizontal,
                        f64::from(pos.x),
                    );
                } else if top_handle.contains(pos) {
                    self.controller.begin_minimap_resize(
                        &self.store,
                        controller::ResizeAxis::Vertical,
                        f64::from(pos.y),
                    );
                } else if mini_rect.contains(pos) {
                    self.controller.begin_minimap_drag(
                        &mut self.store,
                        f64::from(pos.x - mini_origin.x),
                        f64::from(pos.y - mini_origin.y),
                        vw,
                        vh,
                    );
                } else {
                    self.controller.begin_pan(
                        &mut self.store,
                        f64::from(pos.x - canvas.left()),
                        f64::from(pos.y - canvas.top()),
                    );
                }
            }
        }

        if response.dragged() {
            if let Some(pos) = response.interact_pointer_pos() {
                if let Some(axis) = self.controller.minimap_resize_axis() {
                    let pointer = match axis {
                        controller::ResizeAxis::Horizontal => f64::from(pos.x),
                        controller::ResizeAxis::Vertical => f64::from(pos.y),
                    };
                    self.controller.minimap_resize_move(&mut self.store, pointer);
                } else if self.controller.is_minimap_dragging() {
                    self.controller.minimap_move(
                        &mut self.store,
                        f64::from(pos.x - mini_origin.x),
                        f64::from(pos.y - mini_origin.y),
                        vw,
                        vh,
                    );
                } else {
                    self.controller.pan_move(
                        &mut self.store,
                        f64::from(pos.x - canvas.left()),
                        f64::from(pos.y - canvas.top()),
                        vw,
                        vh,
                    );
                }
            }
        }

        if response.drag_stopped() {
            self.controller.end_pan(&mut self.store);
            self.controller.end_minimap_drag();
            self.controller.end_minimap_resize();
        }

        // A plain click on the minimap recenters without starting a drag.
        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                if mini_rect.contains(pos) {
                    self.controller.begin_minimap_drag(
                        &mut self.store,
                        f64::from(pos.x - mini_origin.x),
                        f64::from(pos.y - mini_origin.y),
                        vw,
                        vh,
                    );
                    self.controller.end_minimap_drag();
                }
            }
        }

        // Wheel zoom toward the cursor.
        let scroll = ui.input(|i| i.smooth_scroll_delta);
        if scroll.y.abs() > 0.1 {
            if let Some(pos) = ui.input(|i| i.pointer.hover_pos()) {
                if canvas.contains(pos) && !mini_rect.contains(pos) {
                    let cursor = (
                        f64::from(pos.x - canvas.left()),
                        f64::from(pos.y - canvas.top()),
                    );
                    controller::wheel_zoom(&mut self.store, scroll.y > 0.0, cursor, vw, vh);
                }
            }
        }

        self.keyboard(ui, vw, vh);

        // ── Paint ──────────────────────────────────────────────────────
        let mut painter = ui.painter_at(canvas);
        let bg = crate::theme::resolve(
            city_canvas_protocol::ThemeToken::Background,
            self.theme_mode,
        );
        painter.rect_filled(canvas, egui::CornerRadius::ZERO, bg);

        let viewport = Viewport::new(vw, vh);
        let grid_cmds = grid::render_grid(
            self.store.city_size(),
            self.store.unit(),
            self.store.view(),
            &viewport,
        );
        renderer::render_commands(&mut painter, &grid_cmds, canvas.left_top(), self.theme_mode);

        let bar = scale_bar::select(self.store.view().zoom, self.store.unit());
        let bar_cmds = scale_bar::render_scale_bar(&bar, &viewport);
        renderer::render_commands(&mut painter, &bar_cmds, canvas.left_top(), self.theme_mode);

        let mini_cmds = minimap::render_minimap(
            self.store.city_size(),
            self.store.unit(),
            self.store.view(),
            self.store.minimap_max_size(),
            &viewport,
        );
        renderer::render_commands(&mut painter, &mini_cmds, mini_origin, self.theme_mode);

        self.control_cluster(ui, canvas);

        // Cursor feedback.
        if self.build_mode {
            response.on_hover_cursor(egui::CursorIcon::Crosshair);
        } else if self.controller.is_panning() {
            response.on_hover_cursor(egui::CursorIcon::Grabbing);
        } else if ui
            .input(|i| i.pointer.hover_pos())
            .is_some_and(|p| left_handle.contains(p))
        {
            response.on_hover_cursor(egui::CursorIcon::ResizeHorizontal);
        } else if ui
            .input(|i| i.pointer.hover_pos())
            .is_some_and(|p| top_handle.contains(p))
        {
            response.on_hover_cursor(egui::CursorIcon::ResizeVertical);
        }
    }

    fn keyboard(&mut self, ui: &egui::Ui, vw: f64, vh: f64) {
        // Shortcuts yield to the settings panel and any focused text
        // field.
        if self.settings_open || ui.ctx().wants_keyboard_input() {
            return;
        }
        ui.input(|i| {
            use egui::Key;
            let pans = [
                (Key::ArrowUp, PanDirection::Up),
                (Key::W, PanDirection::Up),
                (Key::ArrowDown, PanDirection::Down),
                (Key::S, PanDirection::Down),
                (Key::ArrowLeft, PanDirection::Left),
                (Key::A, PanDirection::Left),
                (Key::ArrowRight, PanDirection::Right),
                (Key::D, PanDirection::Right),
            ];
            for (key, dir) in pans {
                if i.key_pressed(key) {
                    controller::pan_step(&mut self.store, dir, vw, vh);
                }
            }
            if i.key_pressed(Key::Plus) || i.key_pressed(Key::Equals) {
                controller::zoom_step(&mut self.store, ZoomDirection::In, vw, vh);
            }
            if i.key_pressed(Key::Minus) {
                controller::zoom_step(&mut self.store, ZoomDirection::Out, vw, vh);
            }
        });
    }
}

impl eframe::App for CityApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.toolbar(ctx);
        self.status_bar(ctx);
        self.settings_window(ctx);

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                self.canvas(ui);
            });
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        // eframe drives the save cycle; skip it entirely when nothing
        // changed since the last one.
        if !self.store.take_dirty().any() {
            return;
        }
        for key in PERSIST_KEYS {
            if let Ok(json) = self.store.to_persist(key) {
                storage.set_string(key, json);
            }
        }
    }
}
