use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 2000;
pub const DEFAULT_CHART_INTERVAL_MS: u64 = 1000;

#[derive(serde::Deserialize, serde::Serialize, Clone, PartialEq)]
#[serde(default)] // settings saved by older versions still load
pub struct Settings {
    pub scale: f32,
    pub font_size: f32,
    /// Process table, history and users cadence
    pub refresh_interval_ms: u64,
    /// System chart cadence
    pub chart_interval_ms: u64,
    /// Where CSV exports are written
    pub log_dir: PathBuf,
    #[serde(skip)]
    show_window: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scale: 1.2,
            font_size: 15.0,
            refresh_interval_ms: DEFAULT_REFRESH_INTERVAL_MS,
            chart_interval_ms: DEFAULT_CHART_INTERVAL_MS,
            log_dir: PathBuf::from("logs"),
            show_window: false,
        }
    }
}

impl Settings {
    pub fn show(&mut self) {
        self.show_window = true;
    }

    pub fn is_visible(&self) -> bool {
        self.show_window
    }

    pub fn hide(&mut self) {
        self.show_window = false;
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms.max(100))
    }

    pub fn chart_interval(&self) -> Duration {
        Duration::from_millis(self.chart_interval_ms.max(100))
    }

    pub fn apply(&self, ctx: &egui::Context) {
        ctx.set_pixels_per_point(self.scale);

        let mut style = (*ctx.style()).clone();
        style.text_styles = [
            (
                egui::TextStyle::Heading,
                egui::FontId::new(self.font_size + 4.0, egui::FontFamily::Proportional),
            ),
            (
                egui::TextStyle::Body,
                egui::FontId::new(self.font_size, egui::FontFamily::Proportional),
            ),
            (
                egui::TextStyle::Monospace,
                egui::FontId::new(self.font_size, egui::FontFamily::Monospace),
            ),
            (
                egui::TextStyle::Button,
                egui::FontId::new(self.font_size, egui::FontFamily::Proportional),
            ),
            (
                egui::TextStyle::Small,
                egui::FontId::new(self.font_size - 2.0, egui::FontFamily::Proportional),
            ),
        ]
        .into();
        ctx.set_style(style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_monitor_cadence() {
        let settings = Settings::default();
        assert_eq!(settings.refresh_interval(), Duration::from_millis(2000));
        assert_eq!(settings.chart_interval(), Duration::from_millis(1000));
        assert_eq!(settings.log_dir, PathBuf::from("logs"));
    }

    #[test]
    fn intervals_have_a_floor() {
        let settings = Settings {
            refresh_interval_ms: 0,
            ..Default::default()
        };
        assert_eq!(settings.refresh_interval(), Duration::from_millis(100));
    }
}
