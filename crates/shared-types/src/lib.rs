pub mod config;
pub mod error;
pub mod export;
pub mod feature_flags;
pub mod parent;
pub mod record;
pub mod requests;
pub mod student;
pub mod teacher;

pub use config::*;
pub use error::*;
pub use export::*;
pub use feature_flags::*;
pub use parent::*;
pub use record::*;
pub use requests::*;
pub use student::*;
pub use teacher::*;
