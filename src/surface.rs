use attitude_render::{CompassDial, CompassNeedle, ModelStyle, Readouts, RenderSurface};
use glam::Vec3;
use tracing::{debug, info};

/// Readouts are logged at most this often, in frames (1 s at 20 Hz).
const READOUT_LOG_EVERY: u64 = 20;

/// Headless surface that writes frames to the log.
pub struct LogSurface {
    frames: u64,
    last_readouts: Option<Readouts>,
}

impl LogSurface {
    pub fn new() -> Self {
        Self {
            frames: 0,
            last_readouts: None,
        }
    }
}

impl RenderSurface for LogSurface {
    fn draw_model(&mut self, polygons: &[Vec<Vec3>], style: &ModelStyle) {
        // The bow tip sits in the deck polygon; tracking it shows the attitude.
        let bow = polygons.last().and_then(|deck| deck.get(2)).copied();
        debug!(
            faces = polygons.len(),
            ?bow,
            face = %style.face_color,
            edge = %style.edge_color,
            extent = style.extent,
            "Model"
        );
    }

    fn draw_compass(&mut self, dial: &CompassDial, needle: &CompassNeedle) {
        debug!(
            angle_rad = needle.angle,
            color = %needle.color.color(),
            outline = %needle.outline,
            zero_bearing = dial.zero_bearing_deg,
            clockwise = dial.clockwise,
            "Compass"
        );
    }

    fn show_readouts(&mut self, readouts: &Readouts) {
        self.frames += 1;
        let changed = self.last_readouts.as_ref() != Some(readouts);
        if changed && self.frames % READOUT_LOG_EVERY == 0 {
            info!(
                pitch = %readouts.pitch,
                roll = %readouts.roll,
                heading = %readouts.heading,
                "Orientation"
            );
            self.last_readouts = Some(readouts.clone());
        }
    }
}
