use crate::mesh::{ReferenceMesh, HULL, VIEW_EXTENT};
use crate::transform::{orientation_frame, CompassDial, CompassNeedle, COMPASS_DIAL};
use attitude_config::{AppearanceConfig, Color};
use attitude_link::state::OrientationState;
use attitude_link::types::{ConnectionState, OrientationSample};
use glam::Vec3;
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

/// Styling of the 3D model polygons.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelStyle {
    pub face_color: Color,
    pub edge_color: Color,
    pub edge_width: f32,
    /// Face opacity, `0.0..=1.0`.
    pub alpha: f32,
    /// Axis limits of the 3D view, `-extent..=extent` on X, Y and Z.
    pub extent: f32,
}

impl From<&AppearanceConfig> for ModelStyle {
    fn from(appearance: &AppearanceConfig) -> Self {
        Self {
            face_color: appearance.face_color,
            edge_color: appearance.edge_color,
            edge_width: 1.0,
            alpha: 0.8,
            extent: VIEW_EXTENT,
        }
    }
}

impl Default for ModelStyle {
    fn default() -> Self {
        Self::from(&AppearanceConfig::default())
    }
}

/// Numeric readouts, one decimal place with a degree sign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Readouts {
    pub pitch: String,
    pub roll: String,
    pub heading: String,
}

impl From<&OrientationSample> for Readouts {
    fn from(sample: &OrientationSample) -> Self {
        Self {
            pitch: format!("{:.1}°", sample.pitch),
            roll: format!("{:.1}°", sample.roll),
            heading: format!("{:.1}°", sample.heading),
        }
    }
}

/// The drawing side of the application: a 3D canvas, a polar compass and text readouts.
pub trait RenderSurface {
    /// Replace the model with these polygons.
    fn draw_model(&mut self, polygons: &[Vec<Vec3>], style: &ModelStyle);
    /// Redraw the compass needle on a dial laid out as `dial`.
    fn draw_compass(&mut self, dial: &CompassDial, needle: &CompassNeedle);
    fn show_readouts(&mut self, readouts: &Readouts);
}

/// Fixed-rate render loop.
///
/// Each tick, while the link is connected, takes the latest orientation,
/// builds a frame and hands it to the surface. Disconnected ticks do nothing
/// but the loop keeps going, so a reconnect shows up on the next tick.
/// Samples that arrive between ticks are simply overwritten.
pub struct RenderScheduler {
    mesh: ReferenceMesh,
    orientation: OrientationState,
    connection: watch::Receiver<ConnectionState>,
    style: watch::Receiver<ModelStyle>,
    period: Duration,
    frame_count: u64,
}

impl RenderScheduler {
    pub fn new(
        orientation: OrientationState,
        connection: watch::Receiver<ConnectionState>,
        style: watch::Receiver<ModelStyle>,
        period: Duration,
    ) -> Self {
        Self {
            mesh: HULL,
            orientation,
            connection,
            style,
            period,
            frame_count: 0,
        }
    }

    /// Draw a different solid.
    pub fn with_mesh(mut self, mesh: ReferenceMesh) -> Self {
        self.mesh = mesh;
        self
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Frames submitted so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Run one tick. Returns whether a frame was submitted.
    pub fn tick<S: RenderSurface + ?Sized>(&mut self, surface: &mut S) -> bool {
        if !self.connection.borrow().is_connected() {
            return false;
        }

        let sample = self.orientation.get();
        let frame = orientation_frame(&self.mesh, &sample);
        let style = *self.style.borrow();

        surface.show_readouts(&Readouts::from(&sample));
        surface.draw_model(&frame.polygons(), &style);
        surface.draw_compass(&COMPASS_DIAL, &frame.compass);

        self.frame_count += 1;
        if self.frame_count % 600 == 0 {
            tracing::debug!(frames = self.frame_count, "Render heartbeat");
        }
        true
    }

    /// Tick every `period` until `shutdown` completes.
    pub async fn run<S, F>(&mut self, surface: &mut S, shutdown: F)
    where
        S: RenderSurface + ?Sized,
        F: Future<Output = ()>,
    {
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        tracing::info!(
            period_ms = u64::try_from(self.period.as_millis()).unwrap_or(u64::MAX),
            "Render loop started"
        );
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = interval.tick() => {
                    self.tick(surface);
                }
            }
        }
        tracing::info!(frames = self.frame_count, "Render loop stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::ArrowColor;
    use attitude_link::protocol::parse_line;

    #[derive(Default)]
    struct RecordingSurface {
        models: Vec<(Vec<Vec<Vec3>>, ModelStyle)>,
        needles: Vec<CompassNeedle>,
        readouts: Vec<Readouts>,
    }

    impl RenderSurface for RecordingSurface {
        fn draw_model(&mut self, polygons: &[Vec<Vec3>], style: &ModelStyle) {
            self.models.push((polygons.to_vec(), *style));
        }

        fn draw_compass(&mut self, dial: &CompassDial, needle: &CompassNeedle) {
            assert_eq!(*dial, COMPASS_DIAL);
            self.needles.push(*needle);
        }

        fn show_readouts(&mut self, readouts: &Readouts) {
            self.readouts.push(readouts.clone());
        }
    }

    struct Harness {
        state: OrientationState,
        connection_tx: watch::Sender<ConnectionState>,
        style_tx: watch::Sender<ModelStyle>,
        scheduler: RenderScheduler,
    }

    fn harness() -> Harness {
        let state = OrientationState::new();
        let (connection_tx, connection_rx) = watch::channel(ConnectionState::Disconnected);
        let (style_tx, style_rx) = watch::channel(ModelStyle::default());
        let scheduler = RenderScheduler::new(
            state.clone(),
            connection_rx,
            style_rx,
            Duration::from_millis(50),
        );
        Harness {
            state,
            connection_tx,
            style_tx,
            scheduler,
        }
    }

    #[test]
    fn disconnected_ticks_draw_nothing() {
        let mut h = harness();
        let mut surface = RecordingSurface::default();
        h.state.set(OrientationSample::new(10.0, 20.0, 30.0));

        assert!(!h.scheduler.tick(&mut surface));
        h.connection_tx.send_replace(ConnectionState::Failed("gone".into()));
        assert!(!h.scheduler.tick(&mut surface));

        assert!(surface.models.is_empty());
        assert!(surface.needles.is_empty());
        assert!(surface.readouts.is_empty());
        assert_eq!(h.scheduler.frame_count(), 0);
    }

    #[test]
    fn connected_tick_submits_one_of_each() {
        let mut h = harness();
        let mut surface = RecordingSurface::default();
        h.connection_tx.send_replace(ConnectionState::Connected);
        h.state.set(OrientationSample::new(12.34, -56.78, 123.45));

        assert!(h.scheduler.tick(&mut surface));

        assert_eq!(surface.models.len(), 1);
        assert_eq!(surface.needles.len(), 1);
        assert_eq!(
            surface.readouts,
            vec![Readouts {
                pitch: "12.3°".into(),
                roll: "-56.8°".into(),
                heading: "123.5°".into(),
            }]
        );
        let (polygons, style) = &surface.models[0];
        assert_eq!(polygons.len(), HULL.faces.len());
        assert_eq!(*style, ModelStyle::default());
        assert!((surface.needles[0].angle - 123.45_f64.to_radians()).abs() < 1e-12);
        assert_eq!(style.extent, 3.0);
        assert_eq!(surface.needles[0].color, ArrowColor::Red);
        assert_eq!(surface.needles[0].outline, Color::WHITE);
    }

    #[test]
    fn same_sample_is_redrawn_until_replaced() {
        let mut h = harness();
        let mut surface = RecordingSurface::default();
        h.connection_tx.send_replace(ConnectionState::Connected);
        h.state.set(OrientationSample::new(5.0, 0.0, 0.0));

        h.scheduler.tick(&mut surface);
        h.scheduler.tick(&mut surface);
        assert_eq!(surface.models[0].0, surface.models[1].0);

        // Only the latest of several writes between ticks is drawn.
        h.state.set(OrientationSample::new(1.0, 0.0, 0.0));
        h.state.set(OrientationSample::new(2.0, 0.0, 0.0));
        h.scheduler.tick(&mut surface);
        assert_eq!(surface.readouts[2].pitch, "2.0°");
    }

    #[test]
    fn color_change_applies_on_next_tick() {
        let mut h = harness();
        let mut surface = RecordingSurface::default();
        h.connection_tx.send_replace(ConnectionState::Connected);

        h.scheduler.tick(&mut surface);
        h.style_tx.send_modify(|s| {
            s.face_color = Color::rgb(1, 2, 3);
            s.edge_color = Color::rgb(4, 5, 6);
        });
        h.scheduler.tick(&mut surface);

        assert_eq!(surface.models[0].1.face_color, Color::rgb(0xA6, 0x00, 0xFF));
        assert_eq!(surface.models[1].1.face_color, Color::rgb(1, 2, 3));
        assert_eq!(surface.models[1].1.edge_color, Color::rgb(4, 5, 6));
    }

    #[test]
    fn reconnect_resumes_drawing() {
        let mut h = harness();
        let mut surface = RecordingSurface::default();

        h.connection_tx.send_replace(ConnectionState::Connected);
        assert!(h.scheduler.tick(&mut surface));
        h.connection_tx.send_replace(ConnectionState::Disconnected);
        assert!(!h.scheduler.tick(&mut surface));
        h.connection_tx.send_replace(ConnectionState::Connected);
        assert!(h.scheduler.tick(&mut surface));

        assert_eq!(h.scheduler.frame_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn run_ticks_at_fixed_period_until_shutdown() {
        let mut h = harness();
        let mut surface = RecordingSurface::default();
        h.connection_tx.send_replace(ConnectionState::Connected);

        // Ticks at 0, 50, 100 and 150 ms.
        h.scheduler
            .run(&mut surface, tokio::time::sleep(Duration::from_millis(175)))
            .await;

        assert_eq!(h.scheduler.frame_count(), 4);
        assert_eq!(surface.models.len(), 4);
    }

    #[test]
    fn custom_mesh_is_drawn() {
        const TRIANGLE: ReferenceMesh = ReferenceMesh {
            vertices: &[Vec3::X, Vec3::Y, Vec3::Z],
            faces: &[&[0, 1, 2]],
        };
        let mut h = harness();
        h.scheduler = h.scheduler.with_mesh(TRIANGLE);
        let mut surface = RecordingSurface::default();
        h.connection_tx.send_replace(ConnectionState::Connected);

        h.scheduler.tick(&mut surface);

        assert_eq!(surface.models[0].0, vec![vec![Vec3::X, Vec3::Y, Vec3::Z]]);
    }

    #[test]
    fn readouts_of_wire_line_match_device_display() {
        let sample =
            parse_line("Pitch: 12.34 | Roll: -56.78 | Heading: 123.45 deg | Dir: NORTE").unwrap();
        let r = Readouts::from(&sample);
        assert_eq!(r.pitch, "12.3°");
        assert_eq!(r.roll, "-56.8°");
        assert_eq!(r.heading, "123.5°");

        let sample = parse_line("Pitch: 0.15 | Roll: 0.35 | Heading: 337.49999999 deg").unwrap();
        let r = Readouts::from(&sample);
        assert_eq!(r.pitch, "0.1°");
        assert_eq!(r.roll, "0.3°");
        assert_eq!(r.heading, "337.5°");
        // Displayed as 337.5 but still short of the North sector.
        assert_eq!(CompassNeedle::from_heading(sample.heading).color, ArrowColor::Red);
    }

    #[test]
    fn readouts_round_to_one_decimal() {
        let r = Readouts::from(&OrientationSample::new(0.04, -0.06, 359.96));
        assert_eq!(r.pitch, "0.0°");
        assert_eq!(r.roll, "-0.1°");
        assert_eq!(r.heading, "360.0°");
    }
}
