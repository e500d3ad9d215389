//! Hydrological flow-field algorithms
//!
//! Two direction solvers share one data model and one accumulation
//! stage:
//!
//! - Priority-flood: processes cells in elevation order from the
//!   boundary inward (Barnes 2014 family). Correct over flats and pits;
//!   every boundary cell becomes an outlet. Also emits the processing
//!   sequence that drives the ordered accumulation pass.
//! - Local-slope D8: picks each cell's steepest downslope neighbor in
//!   isolation. Interior pits and flats keep direction 0 and truncate
//!   accumulation; kept as the simpler alternative front-end.

pub(crate) mod flow_accumulation;
pub(crate) mod flow_direction;
pub(crate) mod priority_flood;

pub use flow_accumulation::{
    flow_accumulation_ordered, flow_accumulation_trace, FlowAccumulation,
};
pub use flow_direction::{flow_direction, FlowDirection};
pub use priority_flood::{flow_direction_priority_flood, PriorityFloodFlow, PriorityFloodResult};
