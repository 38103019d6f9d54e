pub mod events;
pub mod ids;
pub mod mode;
pub mod task;

pub use events::TaskEvent;
pub use ids::TaskId;
pub use mode::DispatchMode;
pub use task::TaskMessage;
