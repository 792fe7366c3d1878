pub mod animation;
pub mod config;
pub mod error;
pub mod events;
pub mod mime;
pub mod playback;
pub mod scanner;
pub mod session;
pub mod tasks {
    pub mod heartbeat;
    pub mod renderer;
    pub mod router;
    pub mod stdio;
}
