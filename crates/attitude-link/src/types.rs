/// One orientation reading decoded from the sensor stream.
///
/// All angles are in degrees. `heading` is the compass bearing, clockwise from North.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OrientationSample {
    pub pitch: f64,
    pub roll: f64,
    pub heading: f64,
}

impl OrientationSample {
    pub fn new(pitch: f64, roll: f64, heading: f64) -> Self {
        Self {
            pitch,
            roll,
            heading,
        }
    }
}

/// Lifecycle of the serial connection, as published to observers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connected,
    /// The stream died mid-session. Carries a human-readable reason.
    Failed(String),
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }
}
