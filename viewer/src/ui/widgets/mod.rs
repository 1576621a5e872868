pub mod board;
pub mod controls_panel;
pub mod engine_log_panel;
pub mod info_panel;

pub use board::BoardWidget;
pub use controls_panel::ControlsPanel;
pub use engine_log_panel::EngineLogPanel;
pub use info_panel::InfoPanel;
