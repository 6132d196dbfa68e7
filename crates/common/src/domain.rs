mod certificate;
mod clock;
mod document;
mod envelope;
mod result;

pub use certificate::*;
pub use clock::*;
pub use document::*;
pub use envelope::*;
pub use result::*;
