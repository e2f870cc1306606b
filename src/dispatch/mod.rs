mod dispatcher;

pub use dispatcher::{CreateOutcome, DeleteOutcome, EventDispatcher};
