/// Buffer module - graphics buffers and their CPU mappings

pub mod buffer_desc;
pub mod strategy;
pub mod graphics_buffer;
pub mod map_session;

pub use buffer_desc::*;
pub use strategy::{CopyStrategy, EntryPoint, MapRequest, MapStrategy, Strategy, TexelViewStrategy};
pub use graphics_buffer::GraphicsBuffer;
pub use map_session::MapSession;
