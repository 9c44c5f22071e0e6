pub mod company;
pub mod dashboard;
pub mod prompt;
pub mod visibility;

pub use company::*;
pub use dashboard::*;
pub use prompt::*;
pub use visibility::*;
