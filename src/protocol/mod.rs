//! Protocol framing: wire format, frame struct and reassembly buffer.

mod frame;
mod frame_buffer;
pub mod wire_format;

pub use frame::{Frame, CURVE_MESSAGE_ID, RESULT_MESSAGE_ID};
pub use frame_buffer::FrameBuffer;
pub use wire_format::{
    decode_frame, declared_length, encode_command, DEFAULT_MAX_PAYLOAD_SIZE, ETX, MIN_FRAME_SIZE,
    STX,
};
