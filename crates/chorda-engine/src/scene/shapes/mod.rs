pub(crate) mod chord;
pub(crate) mod label;
pub(crate) mod ring;

pub use chord::Chord;
pub use label::Label;
pub use ring::Ring;
