pub mod assessment;
pub mod enums;
pub mod profile;
pub mod record;

pub use assessment::*;
pub use enums::*;
pub use profile::*;
pub use record::*;
