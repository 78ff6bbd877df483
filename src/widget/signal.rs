//! Latest-value observables for scroll offset and viewport size.
//!
//! Backed by `tokio::sync::watch`: a subscriber only ever sees the most
//! recent value, never a backlog.  Dropping a [`Subscription`] is
//! unsubscribing.

use tokio::sync::watch;

use crate::dom::Viewport;

/// Publisher side of an observable value.
#[derive(Debug)]
pub struct Signal<T> {
    tx: watch::Sender<T>,
}

pub type ScrollSource = Signal<f64>;
pub type ViewportSource = Signal<Viewport>;

impl<T: Copy + PartialEq> Signal<T> {
    pub fn new(initial: T) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx }
    }

    /// Publish `value`; subscribers are only woken when it differs.
    pub fn set(&self, value: T) {
        self.tx.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        });
    }

    /// Subscribe.  The current value counts as already seen.
    pub fn subscribe(&self) -> Subscription<T> {
        Subscription {
            rx: self.tx.subscribe(),
        }
    }
}

#[cfg(test)]
impl<T: Copy> Signal<T> {
    pub fn get(&self) -> T {
        *self.tx.borrow()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// Subscriber side of a [`Signal`].
#[derive(Debug)]
pub struct Subscription<T> {
    rx: watch::Receiver<T>,
}

impl<T: Copy> Subscription<T> {
    /// The latest value if it changed since the last call.
    pub fn changed(&mut self) -> Option<T> {
        match self.rx.has_changed() {
            Ok(true) => Some(*self.rx.borrow_and_update()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscriber_sees_only_latest_value() {
        let source = ScrollSource::new(0.0);
        let mut sub = source.subscribe();
        assert_eq!(sub.changed(), None);

        source.set(10.0);
        source.set(20.0);
        assert_eq!(sub.changed(), Some(20.0));
        assert_eq!(sub.changed(), None);
    }

    #[test]
    fn unchanged_value_does_not_notify() {
        let source = ViewportSource::new(Viewport::new(640.0, 384.0));
        let mut sub = source.subscribe();
        source.set(Viewport::new(640.0, 384.0));
        assert_eq!(sub.changed(), None);
        source.set(Viewport::new(320.0, 384.0));
        assert_eq!(sub.changed().map(|v| v.width), Some(320.0));
    }

    #[test]
    fn dropping_subscription_unsubscribes() {
        let source = ScrollSource::new(0.0);
        let sub = source.subscribe();
        assert_eq!(source.subscriber_count(), 1);
        drop(sub);
        assert_eq!(source.subscriber_count(), 0);
        source.set(5.0);
        assert_eq!(source.get(), 5.0);
    }
}
