//! Version parsing, ordering and resolution

pub mod model;
pub mod ordering;
pub mod resolve;

pub use model::{parse_lenient, ParsedVersion, VersionResolution};
pub use ordering::{compare_logical, logically_sorted, LogicalVersion};
pub use resolve::{resolve_version, INSTALLED, LATEST};
