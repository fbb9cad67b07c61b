mod loader;

pub use loader::{
    AbstractOverrideConfig, Config, InspectionsConfig, RedundantOverrideConfig, ReportConfig, SearchConfig,
};
