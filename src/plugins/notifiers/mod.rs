// Notifier implementations
pub mod twilio;

pub use twilio::TwilioNotifier;
