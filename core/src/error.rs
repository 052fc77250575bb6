//! Error types for surface construction
//!
//! Only construction can fail. The per-tick deformation path treats every
//! precondition violation as a silent no-op instead of an error.

/// Invalid mesh data handed to a surface
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MeshError {
    /// Mesh has no vertices
    #[error("mesh has no vertices")]
    Empty,

    /// Normal buffer does not line up with the position buffer
    #[error("mesh has {positions} positions but {normals} normals")]
    NormalCountMismatch { positions: usize, normals: usize },

    /// Mesh has vertices but no faces
    #[error("mesh has no triangles")]
    NoTriangles,

    /// Flat index buffer cannot be split into triangles
    #[error("index buffer length {0} is not a multiple of 3")]
    IndexCountNotTriangles(usize),

    /// Triangle references a vertex that does not exist
    #[error("triangle {triangle} references vertex {index} but the mesh has {vertex_count} vertices")]
    IndexOutOfBounds {
        triangle: usize,
        index: u32,
        vertex_count: usize,
    },

    /// Vertex count does not fit in a 32-bit index
    #[error("mesh has {0} vertices, more than a u32 index can address")]
    TooManyVertices(usize),
}

/// Invalid tuning values in a [`SurfaceConfig`](crate::SurfaceConfig)
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// A value that must be strictly positive was not
    #[error("{field} must be > 0 (got {value})")]
    NotPositive { field: &'static str, value: f32 },

    /// A value that must be zero or more was negative
    #[error("{field} must be >= 0 (got {value})")]
    Negative { field: &'static str, value: f32 },

    /// A probability or fraction outside [0, 1]
    #[error("{field} must be within 0.0..=1.0 (got {value})")]
    OutOfUnitRange { field: &'static str, value: f32 },

    /// Jitter range with min above max
    #[error("jitter range is inverted ({min} > {max})")]
    InvertedJitter { min: f32, max: f32 },

    /// TOML could not be parsed into a configuration
    #[error("failed to parse surface config: {0}")]
    Parse(String),

    /// Configuration could not be serialized
    #[error("failed to serialize surface config: {0}")]
    Serialize(String),
}

/// Failure to build a [`Surface`](crate::Surface)
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SurfaceError {
    #[error(transparent)]
    Mesh(#[from] MeshError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
