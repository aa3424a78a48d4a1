pub mod booking;
pub mod conversation;
pub mod intent;
pub mod session;

pub use booking::{BookingStage, BookingState, Doctor, TimeSlot, Transition};
pub use conversation::{ConversationLog, Speaker, Turn};
pub use intent::{CompletionReply, Intent, RouteResult};
pub use session::{BookingView, Session, SessionView, GREETING};
