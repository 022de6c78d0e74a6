pub mod background;
pub mod debug_log;
pub mod events;
pub mod maps;
pub mod overlay;
pub mod session;
pub mod view;

pub use events::Event;
pub use overlay::Arrow;
pub use session::Session;
pub use view::ViewModel;
