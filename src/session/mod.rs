pub mod auto_advance;
pub mod controller;

pub use auto_advance::{AutoAdvance, AutoAdvanceTicket};
pub use controller::{
    CourseProgress, LessonSession, LessonStatus, ResumeOffer, SelectOutcome, SessionEvent,
};
