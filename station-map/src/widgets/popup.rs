use egui::RichText;

use crate::surface::Popup;

/// A small window with the popup text of the selected marker.
pub struct WidgetPopup {
    pub popup: Popup,
}

impl WidgetPopup {
    pub fn new(popup: Popup) -> Self {
        Self { popup }
    }

    /// Shows the window; returns `false` once the user closed it.
    pub fn show(&mut self, ctx: &egui::Context) -> bool {
        let mut open = true;

        egui::Window::new(RichText::new(&self.popup.title).strong())
            .id(egui::Id::new("marker-popup"))
            .resizable(false)
            .collapsible(false)
            .open(&mut open)
            .fixed_pos([20.0, 20.0])
            .show(ctx, |ui| {
                ui.visuals_mut().override_text_color = Some(egui::Color32::WHITE);
                ui.label(RichText::new(&self.popup.title).size(18.0).strong());
                if let Some(body) = &self.popup.body {
                    ui.add_space(6.0);
                    ui.label(RichText::new(body).size(15.0));
                }
            });

        open
    }
}
