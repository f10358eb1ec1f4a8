//! Rolling stock composition of a train.

/// A single carriage or locomotive.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositionUnit {
    /// Material type, e.g. `M6` or `AM96`.
    pub material_type: String,
    pub has_toilet: bool,
    pub has_bike_section: bool,
    /// Section accessible to passengers with reduced mobility.
    pub has_prm_section: bool,
}

/// Part of a journey over which the composition stays the same.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositionSegment {
    pub origin: String,
    pub destination: String,
    pub units: Vec<CompositionUnit>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Composition {
    pub segments: Vec<CompositionSegment>,
}
