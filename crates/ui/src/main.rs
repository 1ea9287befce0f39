#[cfg(not(target_arch = "wasm32"))]
fn main() -> eframe::Result<()> {
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_title("city-canvas"),
        ..Default::default()
    };
    eframe::run_native(
        "city-canvas",
        options,
        Box::new(|cc| Ok(Box::new(city_canvas_ui::CityApp::new(cc)))),
    )
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The wasm build starts through the `start` export in lib.rs.
}
