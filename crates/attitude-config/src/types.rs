use crate::color::{hex_serde, Color};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Serial connection settings.
    pub serial: SerialConfig,
    /// Render loop settings.
    pub render: RenderConfig,
    /// Colors of the displayed model.
    pub appearance: AppearanceConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Port used last time. `None` means pick the first available port.
    pub port: Option<String>,
    /// Line speed of the sensor.
    pub baud_rate: u32,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: None,
            baud_rate: 9600,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Refresh period of the display in milliseconds (50 = 20 Hz).
    pub tick_interval_ms: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppearanceConfig {
    /// Fill color of the model's faces.
    #[serde(with = "hex_serde")]
    pub face_color: Color,
    /// Color of the model's edges.
    #[serde(with = "hex_serde")]
    pub edge_color: Color,
}

impl Default for AppearanceConfig {
    fn default() -> Self {
        Self {
            face_color: Color::rgb(0xA6, 0x00, 0xFF),
            edge_color: Color::rgb(0x67, 0x00, 0x9E),
        }
    }
}
