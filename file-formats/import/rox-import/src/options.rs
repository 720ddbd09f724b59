/// How bone weights of a skinned vertex are brought up to a sum of 1.0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WeightCalibration {
    /// Add a small epsilon to each occupied slot in turn until the sum
    /// reaches 1.0. Sums already at or above 1.0 are left alone.
    #[default]
    Iterative,
    /// Divide every occupied weight by the sum.
    Normalize,
}

/// Options for [`crate::import_model`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportOptions {
    /// Emit skinned vertices with bone indices and weights
    pub skinned: bool,
    /// Put every scene mesh into one mesh, one submesh each
    pub pack_meshes: bool,
    pub calibration: WeightCalibration,
}

impl ImportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_skinned(mut self, skinned: bool) -> Self {
        self.skinned = skinned;
        self
    }

    pub fn with_pack_meshes(mut self, pack_meshes: bool) -> Self {
        self.pack_meshes = pack_meshes;
        self
    }

    pub fn with_calibration(mut self, calibration: WeightCalibration) -> Self {
        self.calibration = calibration;
        self
    }
}
