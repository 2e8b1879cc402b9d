//! SysEx protocol: bit transcoding, packet codec, stream framing and bulk transfer.

pub mod bulk;
pub mod framer;
pub mod packet;
pub mod transcode;
pub mod value;

pub use framer::SysexFramer;
pub use packet::{Command, PacketError, SysexPacket};
pub use transcode::{decode_7bit, encode_7bit, TranscodeError};
