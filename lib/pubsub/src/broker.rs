// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-plug subscriber dispatch, grounded in `node/src/Subscriber.cpp`'s
//! `SubscriberList::publishX` family: publishing walks the list, matches on
//! `source.plugIndex`, converts, and resumes the subscriber's barrier with
//! the converted value. There is no queueing -- a subscriber not already
//! parked in `Barrier::wait` misses the publication, same as the source.

use std::rc::Rc;

use runtime::Barrier;

use ringbuf::ringbuf_entry;

use crate::convert::convert;
use crate::events::{Event, PUBSUB_EVENTS};
use crate::plug::{Category, ConvertOptions, Message};

/// Identifies where a delivered message came from, filled in by the broker
/// before resuming the subscriber (mirrors `Subscriber::Parameters::Source`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Source {
    pub plug_index: u8,
    pub connection_index: u8,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Delivery {
    pub source: Source,
    pub message: Message,
}

impl Default for Delivery {
    fn default() -> Self {
        Delivery {
            source: Source { plug_index: 0, connection_index: 0 },
            message: Message::Switch(0),
        }
    }
}

pub struct Subscriber {
    pub source_plug_index: u8,
    pub connection_index: u8,
    pub category: Category,
    pub convert_options: ConvertOptions,
    pub barrier: Rc<Barrier<Delivery>>,
}

#[derive(Default)]
pub struct SubscriberList {
    subscribers: Vec<Subscriber>,
}

impl SubscriberList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, subscriber: Subscriber) {
        self.subscribers.push(subscriber);
    }

    pub fn remove_by_barrier(&mut self, barrier: &Rc<Barrier<Delivery>>) {
        self.subscribers.retain(|s| !Rc::ptr_eq(&s.barrier, barrier));
    }

    /// Dispatches `message`, published from `publisher_category` over
    /// `plug_index`, to every subscriber whose `source_plug_index` matches.
    /// Returns the number of subscribers actually resumed.
    pub fn publish(
        &self,
        plug_index: u8,
        connection_index: u8,
        publisher_category: Category,
        message: Message,
    ) -> usize {
        let mut resumed = 0;
        for subscriber in &self.subscribers {
            if subscriber.source_plug_index != plug_index {
                continue;
            }
            match convert(publisher_category, subscriber.category, message, subscriber.convert_options)
            {
                Some(converted) => {
                    let delivery = Delivery {
                        source: Source { plug_index, connection_index },
                        message: converted,
                    };
                    if subscriber.barrier.resume_first_with(delivery) {
                        resumed += 1;
                        ringbuf_entry!(PUBSUB_EVENTS, Event::Published { plug: plug_index });
                    } else {
                        ringbuf_entry!(
                            PUBSUB_EVENTS,
                            Event::Dropped { reason: DropReason::NoWaiter as u8 }
                        );
                    }
                }
                None => {
                    ringbuf_entry!(
                        PUBSUB_EVENTS,
                        Event::Dropped { reason: DropReason::Incompatible as u8 }
                    );
                }
            }
        }
        resumed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    NoWaiter = 0,
    Incompatible = 1,
}

#[cfg(test)]
mod tests {
    use super::*;
    use runtime::Executor;
    use std::cell::RefCell;

    #[test]
    fn publish_resumes_matching_waiting_subscriber() {
        let exec = Executor::new();
        let barrier = Rc::new(Barrier::<Delivery>::new());
        let received = Rc::new(RefCell::new(None));

        let b = barrier.clone();
        let r = received.clone();
        let handle = exec.spawn(async move {
            *r.borrow_mut() = Some(b.wait().await);
        });
        exec.run_until_idle();

        let mut list = SubscriberList::new();
        list.add(Subscriber {
            source_plug_index: 3,
            connection_index: 0,
            category: Category::BinaryButton,
            convert_options: ConvertOptions::default(),
            barrier: barrier.clone(),
        });

        let resumed = list.publish(3, 0, Category::BinaryButton, Message::Switch(1));
        exec.run_until_idle();

        assert_eq!(resumed, 1);
        assert_eq!(received.borrow().unwrap().message, Message::Switch(1));
        drop(handle);
    }

    #[test]
    fn publish_to_non_waiting_subscriber_is_dropped() {
        let barrier = Rc::new(Barrier::<Delivery>::new());
        let mut list = SubscriberList::new();
        list.add(Subscriber {
            source_plug_index: 1,
            connection_index: 0,
            category: Category::BinaryButton,
            convert_options: ConvertOptions::default(),
            barrier,
        });

        let resumed = list.publish(1, 0, Category::BinaryButton, Message::Switch(1));
        assert_eq!(resumed, 0);
    }

    #[test]
    fn publish_ignores_subscribers_on_a_different_plug() {
        let barrier = Rc::new(Barrier::<Delivery>::new());
        let mut list = SubscriberList::new();
        list.add(Subscriber {
            source_plug_index: 5,
            connection_index: 0,
            category: Category::BinaryButton,
            convert_options: ConvertOptions::default(),
            barrier,
        });

        let resumed = list.publish(6, 0, Category::BinaryButton, Message::Switch(1));
        assert_eq!(resumed, 0);
    }
}
