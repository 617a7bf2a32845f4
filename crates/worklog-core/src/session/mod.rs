mod clock;
mod model;
pub mod steps;

pub use clock::{
    Clock, IdGenerator, ManualClock, SequentialIds, SessionContext, SystemClock, UuidIds,
};
pub use model::{
    completion_percentage, LearningDetails, LearningObjective, PendingEnd, Session, SessionMode,
    SessionStep, StepType,
};
