//! Audio collaborators: decode to PCM and the playback transport.

pub mod decode;
pub mod transport;

pub use transport::{AudioTransport, DecodedTrack, RodioTransport};
