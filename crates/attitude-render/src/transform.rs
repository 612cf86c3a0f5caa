use crate::mesh::ReferenceMesh;
use attitude_config::Color;
use attitude_link::types::OrientationSample;
use glam::{DMat3, Mat3, Vec3};

/// Half-width of the heading band around North that draws the arrow green.
const NORTH_TOLERANCE_DEG: f64 = 22.5;

/// Where a polar plot puts zero and which way angles grow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompassDial {
    /// Compass bearing drawn at the top of the dial, in degrees.
    pub zero_bearing_deg: f64,
    pub clockwise: bool,
}

/// Dial layout the compass needle angle is expressed in: zero at North,
/// growing clockwise. Surfaces apply this to their polar axes; the needle
/// angle itself is never flipped to compensate.
pub const COMPASS_DIAL: CompassDial = CompassDial {
    zero_bearing_deg: 0.0,
    clockwise: true,
};

/// Edge color of the compass arrow, whatever its fill.
pub const ARROW_OUTLINE: Color = Color::WHITE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrowColor {
    /// Heading within 22.5 degrees of North.
    Green,
    Red,
}

impl ArrowColor {
    /// Green from 337.5 up to, but not including, 22.5 degrees. Red otherwise.
    pub fn for_heading(heading_deg: f64) -> Self {
        if heading_deg >= 360.0 - NORTH_TOLERANCE_DEG || heading_deg < NORTH_TOLERANCE_DEG {
            ArrowColor::Green
        } else {
            ArrowColor::Red
        }
    }

    pub fn color(self) -> Color {
        match self {
            ArrowColor::Green => Color::GREEN,
            ArrowColor::Red => Color::RED,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompassNeedle {
    /// Heading in radians, on [`COMPASS_DIAL`].
    pub angle: f64,
    pub color: ArrowColor,
    pub outline: Color,
}

impl CompassNeedle {
    pub fn from_heading(heading_deg: f64) -> Self {
        Self {
            angle: heading_deg.to_radians(),
            color: ArrowColor::for_heading(heading_deg),
            outline: ARROW_OUTLINE,
        }
    }
}

/// Everything needed to draw one tick.
#[derive(Debug, Clone)]
pub struct RenderFrame {
    pub mesh: ReferenceMesh,
    /// Rotated copy of `mesh.vertices`, same length and order.
    pub vertices: Vec<Vec3>,
    pub compass: CompassNeedle,
}

impl RenderFrame {
    /// Rotated faces, ready for a polygon collection.
    pub fn polygons(&self) -> Vec<Vec<Vec3>> {
        self.mesh.polygons(&self.vertices)
    }
}

/// Body rotation for a pitch/roll pair in degrees: `Ry(pitch) * Rx(roll)`.
///
/// Pitch turns about Y and roll about X, with roll applied first. This matches
/// how the sensor is mounted; the order is not interchangeable. Built in double
/// precision and narrowed once for the mesh.
pub fn rotation_matrix(pitch_deg: f64, roll_deg: f64) -> Mat3 {
    (DMat3::from_rotation_y(pitch_deg.to_radians()) * DMat3::from_rotation_x(roll_deg.to_radians()))
        .as_mat3()
}

/// Turn a sample into a frame: rotate every reference vertex and place the compass needle.
pub fn orientation_frame(mesh: &ReferenceMesh, sample: &OrientationSample) -> RenderFrame {
    let rotation = rotation_matrix(sample.pitch, sample.roll);
    RenderFrame {
        mesh: *mesh,
        vertices: mesh.vertices.iter().map(|&v| rotation * v).collect(),
        compass: CompassNeedle::from_heading(sample.heading),
    }
}
