pub mod observation;
pub mod region;

pub use observation::ObservationRecord;
pub use region::{RegionAccumulator, RegionSummary};
