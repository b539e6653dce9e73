//! framewise is a client-side builder for image-processing pipelines
//! executed by an external native imaging engine.
//!
//! A caller assembles decode/resize/rotate/crop/composite/encode operations
//! into a directed graph through the fluent [`PipelineBuilder`], binds byte
//! [`Operand`]s to numeric io slots, and submits the serialized graph through
//! a gated engine-boundary context ([`engine::JobContext`]). The pixel work
//! itself happens inside the engine; this crate owns the graph wiring, the
//! wire format, and the safety protocol around the boundary.
#![forbid(unsafe_code)]

pub mod builder;
pub mod color;
pub mod engine;
pub mod error;
pub mod graph;
pub mod operand;
pub mod presets;
pub mod steps;

pub use builder::PipelineBuilder;
pub use color::{
    Color, ColorFilter, CompositingMode, Filter, FitBox, FitMode, Gravity, ResampleWhen,
    ScalingColorspace, SharpenWhen,
};
pub use engine::{EXECUTE_COMMAND, EngineBackend, JobContext};
pub use error::{FramewiseError, FramewiseResult};
pub use graph::{Edge, EdgeKind, Graph};
pub use operand::{BoundOperand, Direction, Operand};
pub use presets::Preset;
pub use steps::{
    Constrain, ConstraintMode, CopyRectToCanvas, CropWhitespace, DrawImageExact, ExpandCanvas,
    FillRect, Region, RegionPercent, ResampleHints, Step, Watermark,
};
