// Editing session for the studio canvas.

pub mod config;
pub mod editor;
pub mod export;
pub mod notice;
pub mod telemetry;
pub mod tools;

pub use config::{load_config, save_config, CanvasConfig, ConfigError, EditorConfig};
pub use editor::Editor;
pub use export::{ExportConfig, ExportError, ExportJob};
pub use notice::{Notice, NoticeLevel};
pub use tools::{Brush, SelectionPanel, ShapeTool, TextPreset, ToolError, ToolState};
