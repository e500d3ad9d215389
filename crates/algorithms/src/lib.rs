//! # Demflow Algorithms
//!
//! Hydrological flow-field algorithms over integer DEMs:
//!
//! - **Priority-flood flow direction**: best-first traversal from the
//!   raster boundary inward, routing flow across flats and pits in
//!   discovery order
//! - **Local-slope D8 flow direction**: per-cell steepest-drop scan
//! - **Flow accumulation**: upstream contributing cell counts, either
//!   from the priority-flood processing sequence or by downstream
//!   tracing

pub mod hydrology;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::hydrology::{
        flow_accumulation_ordered, flow_accumulation_trace, flow_direction,
        flow_direction_priority_flood, FlowAccumulation, FlowDirection, PriorityFloodFlow,
        PriorityFloodResult,
    };
    pub use demflow_core::prelude::*;
}
