pub mod alias;
pub mod colors;
pub mod figure;
pub mod table;

pub const DASHBOARD_TITLE: &str = "Peta Prioritas Pembangunan Sekolah Rakyat";

pub use alias::{aliases, label};
pub use figure::*;
pub use table::*;
