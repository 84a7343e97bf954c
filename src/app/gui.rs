use egui::{Color32, Frame, ProgressBar, RichText, Rounding, Slider, Stroke};

use crate::app::{file_dialogs, App};

const ACCENT: Color32 = Color32::from_rgb(100, 200, 250);
const DIM_TEXT: Color32 = Color32::from_rgb(160, 160, 160);

pub fn render(app: &mut App, ctx: &egui::Context) {
    menu_bar(app, ctx);

    let frame = Frame {
        fill: Color32::from_rgb(30, 30, 40),
        rounding: Rounding::same(10.0),
        stroke: Stroke::new(1.0, ACCENT),
        inner_margin: egui::style::Margin::same(20.0),
        ..Default::default()
    };

    egui::CentralPanel::default().frame(frame).show(ctx, |ui| {
        ui.heading(RichText::new("WebPow").size(28.0).color(ACCENT));
        ui.label(
            RichText::new("The easiest way to convert your images to WebP").color(DIM_TEXT),
        );
        ui.add_space(12.0);

        pending_list(app, ui);
        ui.add_space(10.0);

        // Quality and resize settings freeze while a batch runs; the
        // worker re-enables them through the Finished update.
        ui.add_enabled_ui(!app.running, |ui| {
            resize_controls(app, ui);
            ui.add_space(8.0);
            quality_controls(app, ui);
        });

        ui.add_space(10.0);
        convert_row(app, ui);

        ui.add_space(10.0);
        log_panel(app, ui);
    });

    drop_overlay(ctx);
}

fn menu_bar(app: &mut App, ctx: &egui::Context) {
    egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
        egui::menu::bar(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui.button("Add Files…").clicked() {
                    ui.close_menu();
                    if let Some(files) = file_dialogs::select_images() {
                        for file in files {
                            app.add_file(file);
                        }
                    }
                }
                if ui.button("Open in Viewer…").clicked() {
                    ui.close_menu();
                    if let Some(file) = file_dialogs::select_viewer_image() {
                        app.log(format!("Opening {} in viewer", file.display()));
                        app.viewers.open_external(file);
                    }
                }
            });
        });
    });
}

/// Darkens the window while files hover over it so the user knows the drop
/// will be accepted.
fn drop_overlay(ctx: &egui::Context) {
    if ctx.input().raw.hovered_files.is_empty() {
        return;
    }
    let painter = ctx.layer_painter(egui::LayerId::new(
        egui::Order::Foreground,
        egui::Id::new("file_drop_overlay"),
    ));
    let screen_rect = ctx.input().screen_rect();
    painter.rect_filled(screen_rect, 0.0, Color32::from_black_alpha(140));
    painter.text(
        screen_rect.center(),
        egui::Align2::CENTER_CENTER,
        "Drop to add images",
        egui::TextStyle::Heading.resolve(&ctx.style()),
        Color32::WHITE,
    );
}

fn pending_list(app: &mut App, ui: &mut egui::Ui) {
    let height = (ui.available_height() - 340.0).max(150.0);
    ui.group(|ui| {
        ui.set_width(ui.available_width());
        ui.set_min_height(height);

        if app.pending.is_empty() {
            ui.centered_and_justified(|ui| {
                ui.label(
                    RichText::new("Drag images here to convert them to WebP")
                        .size(24.0)
                        .color(Color32::from_rgb(120, 120, 120)),
                );
            });
            return;
        }

        let mut remove_selected = false;
        let mut remove_all = false;

        egui::ScrollArea::vertical()
            .id_source("pending_scroll")
            .max_height(height)
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                for path in app.pending.clone() {
                    let selected = app.selected.contains(&path);
                    let response =
                        ui.selectable_label(selected, path.to_string_lossy().into_owned());
                    if response.clicked() {
                        if selected {
                            app.selected.remove(&path);
                        } else {
                            app.selected.insert(path.clone());
                        }
                    }
                    response.context_menu(|ui| {
                        if ui.button("Remove Selected").clicked() {
                            remove_selected = true;
                            ui.close_menu();
                        }
                        if ui.button("Remove All").clicked() {
                            remove_all = true;
                            ui.close_menu();
                        }
                    });
                }
            });

        if remove_selected {
            let count = app.selected.len();
            app.remove_selected();
            app.log(format!("Removed {} file(s) from the list", count));
        }
        if remove_all {
            app.remove_all();
            app.log("Cleared the pending list".to_string());
        }
    });
}

fn resize_controls(app: &mut App, ui: &mut egui::Ui) {
    ui.group(|ui| {
        ui.set_width(ui.available_width());
        ui.checkbox(&mut app.resize_enabled, "Resize Output");
        if app.resize_enabled {
            ui.horizontal(|ui| {
                ui.label("Width");
                ui.add(
                    egui::TextEdit::singleline(&mut app.max_width)
                        .desired_width(80.0)
                        .hint_text("max px"),
                );
                ui.add_space(12.0);
                ui.label("Height");
                ui.add(
                    egui::TextEdit::singleline(&mut app.max_height)
                        .desired_width(80.0)
                        .hint_text("max px"),
                );
            });
            ui.label(
                RichText::new(
                    "Note: set the maximum width or height. Aspect ratio will be maintained.",
                )
                .italics()
                .color(DIM_TEXT),
            );
        }
    });
}

fn quality_controls(app: &mut App, ui: &mut egui::Ui) {
    ui.group(|ui| {
        ui.set_width(ui.available_width());
        ui.add(Slider::new(&mut app.quality, 0..=100).text("Quality"));
    });
}

fn convert_row(app: &mut App, ui: &mut egui::Ui) {
    ui.horizontal(|ui| {
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let convert = ui.add_enabled(!app.running, egui::Button::new("Convert to WebP"));
            if convert.clicked() {
                app.log("Starting conversion…".to_string());
                app.start_conversion(ui.ctx());
            }

            if app.running && app.progress_total > 0 {
                let ratio = app.progress_done as f32 / app.progress_total as f32;
                ui.add_sized(
                    [ui.available_width(), 18.0],
                    ProgressBar::new(ratio)
                        .text(format!("{} / {}", app.progress_done, app.progress_total)),
                );
            } else if let Some(report) = &app.last_report {
                match &report.failure {
                    Some(failure) => {
                        ui.colored_label(
                            Color32::RED,
                            format!("Failed on {}: {}", failure.path.display(), failure.message),
                        );
                    }
                    None => {
                        ui.label(format!("Converted {} file(s)", report.converted.len()));
                    }
                }
            }
        });
    });
}

fn log_panel(app: &App, ui: &mut egui::Ui) {
    ui.group(|ui| {
        ui.set_width(ui.available_width());
        ui.label(RichText::new("Log").size(16.0).color(ACCENT));

        egui::ScrollArea::vertical()
            .id_source("log_scroll")
            .max_height(140.0)
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                let logs = app.log_messages.lock();
                for line in logs.iter() {
                    if line.contains("Failed") || line.contains("aborted") {
                        ui.label(RichText::new(line).color(Color32::RED));
                    } else {
                        ui.label(line);
                    }
                }
            });
    });
}
