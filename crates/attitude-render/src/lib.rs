pub mod mesh;
pub mod scheduler;
pub mod transform;

pub use mesh::{ReferenceMesh, HULL, VIEW_EXTENT};
pub use scheduler::{ModelStyle, Readouts, RenderScheduler, RenderSurface};
pub use transform::{
    orientation_frame, rotation_matrix, ArrowColor, ARROW_OUTLINE, CompassDial, CompassNeedle, RenderFrame,
    COMPASS_DIAL,
};
