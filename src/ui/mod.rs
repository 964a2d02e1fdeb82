pub mod article;
pub mod colors;
pub mod spinner;
pub mod streaming;

pub use article::*;
pub use colors::*;
pub use spinner::Spinner;
pub use streaming::StreamingOutput;
