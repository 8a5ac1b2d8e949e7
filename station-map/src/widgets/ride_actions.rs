/// Callbacks for the ride panel buttons, supplied by whoever embeds the map.
pub struct RideActions {
    on_return: Box<dyn FnMut()>,
    on_report: Box<dyn FnMut()>,
}

impl RideActions {
    pub fn new(on_return: impl FnMut() + 'static, on_report: impl FnMut() + 'static) -> Self {
        Self {
            on_return: Box::new(on_return),
            on_report: Box::new(on_report),
        }
    }

    pub fn return_bike(&mut self) {
        (self.on_return)()
    }

    pub fn report_bike(&mut self) {
        (self.on_report)()
    }

    pub fn show(&mut self, ctx: &egui::Context) {
        egui::Area::new("ride_actions".into())
            .anchor(egui::Align2::RIGHT_BOTTOM, [-10.0, -10.0])
            .show(ctx, |ui| {
                let button_size = [150.0, 48.0];
                ui.horizontal(|ui| {
                    if ui
                        .add_sized(button_size, egui::Button::new("Report bike").rounding(10.0))
                        .clicked()
                    {
                        self.report_bike();
                    }
                    if ui
                        .add_sized(button_size, egui::Button::new("Return bike").rounding(10.0))
                        .clicked()
                    {
                        self.return_bike();
                    }
                });
            });
    }
}
