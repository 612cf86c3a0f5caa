use glam::Vec3;

/// Static geometry of the displayed solid in its unrotated pose.
///
/// Faces are planar polygons given as indices into `vertices`.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceMesh {
    pub vertices: &'static [Vec3],
    pub faces: &'static [&'static [usize]],
}

/// Half-size of the cube the model is drawn in: every axis spans
/// `-VIEW_EXTENT..=VIEW_EXTENT`. Large enough for the hull at any attitude.
pub const VIEW_EXTENT: f32 = 3.0;

/// A small boat hull: +X is the bow, +Z is up.
pub const HULL: ReferenceMesh = ReferenceMesh {
    vertices: &[
        Vec3::new(-2.0, -1.0, 0.5),  // 0: stern, deck, port
        Vec3::new(-2.0, 1.0, 0.5),   // 1: stern, deck, starboard
        Vec3::new(-1.5, -0.5, -0.5), // 2: stern, keel, port
        Vec3::new(-1.5, 0.5, -0.5),  // 3: stern, keel, starboard
        Vec3::new(1.0, -1.0, 0.5),   // 4: midship, deck, port
        Vec3::new(1.0, 1.0, 0.5),    // 5: midship, deck, starboard
        Vec3::new(1.0, -0.5, -0.5),  // 6: midship, keel, port
        Vec3::new(1.0, 0.5, -0.5),   // 7: midship, keel, starboard
        Vec3::new(2.5, 0.0, 0.5),    // 8: bow tip, deck
        Vec3::new(2.0, 0.0, -0.5),   // 9: bow tip, keel
    ],
    faces: &[
        &[0, 1, 3, 2],    // transom
        &[2, 3, 7, 9, 6], // bottom
        &[0, 2, 6, 4],    // port side
        &[1, 5, 7, 3],    // starboard side
        // Bow sides are split into triangles so they stay planar.
        &[4, 6, 9],
        &[4, 9, 8],
        &[5, 8, 9],
        &[5, 9, 7],
        &[0, 4, 8, 5, 1], // deck
    ],
};

impl ReferenceMesh {
    /// Gather the polygons of this mesh from a per-vertex position list.
    ///
    /// `positions` must have the same length and order as `self.vertices`.
    pub fn polygons(&self, positions: &[Vec3]) -> Vec<Vec<Vec3>> {
        debug_assert_eq!(positions.len(), self.vertices.len());
        self.faces
            .iter()
            .map(|face| face.iter().map(|&i| positions[i]).collect())
            .collect()
    }
}
