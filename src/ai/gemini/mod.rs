pub mod chat;
pub mod client;
pub mod imagen;
pub mod types;

pub use chat::GeminiChatClient;
pub use imagen::ImagenClient;
