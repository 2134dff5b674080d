pub mod notifier;
pub mod prober;

pub use notifier::{NotificationReceipt, Notifier, SmsMessage};
pub use prober::{PageProber, ProbeRequest};

#[cfg(test)]
pub use notifier::MockNotifier;
#[cfg(test)]
pub use prober::MockPageProber;
