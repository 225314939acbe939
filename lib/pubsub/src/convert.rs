// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Compatibility matching and message conversion, in the order spec.md
//! §4.7 names: exact match, down-cast, category/switch/value coercion,
//! reject.

use crate::plug::{Category, ConvertOptions, Message, MessageKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRule {
    Exact,
    DownCast,
    Coerce,
    Reject,
}

pub fn match_rule(publisher: Category, subscriber: Category) -> MatchRule {
    if publisher == subscriber {
        return MatchRule::Exact;
    }
    if publisher.is_descendant_of(subscriber) {
        return MatchRule::DownCast;
    }
    if can_coerce(publisher.kind(), subscriber.kind()) {
        return MatchRule::Coerce;
    }
    MatchRule::Reject
}

fn can_coerce(from: MessageKind, to: MessageKind) -> bool {
    matches!(
        (from, to),
        (MessageKind::Switch, MessageKind::Float)
            | (MessageKind::Float, MessageKind::Switch)
            | (MessageKind::Switch, MessageKind::Int8)
            | (MessageKind::Int8, MessageKind::Switch)
            | (MessageKind::FloatCommand, MessageKind::Float)
            | (MessageKind::FloatTransition, MessageKind::Float)
            | (MessageKind::FloatTransition, MessageKind::FloatCommand)
    )
}

/// Converts `message` to `target`'s kind per `options`, returning `None`
/// only when the rule is [`MatchRule::Reject`] -- a `DownCast` or `Exact`
/// match never fails since the kinds already agree.
pub fn convert(
    publisher: Category,
    subscriber: Category,
    message: Message,
    options: ConvertOptions,
) -> Option<Message> {
    match match_rule(publisher, subscriber) {
        MatchRule::Reject => None,
        MatchRule::Exact | MatchRule::DownCast => Some(message),
        MatchRule::Coerce => coerce(message, subscriber.kind(), options),
    }
}

fn coerce(message: Message, to: MessageKind, options: ConvertOptions) -> Option<Message> {
    let as_float = |on: bool| if on { options.on_value } else { 0.0 };
    match (message, to) {
        (Message::Switch(v), MessageKind::Float) => Some(Message::Float(as_float(v != 0))),
        (Message::Float(v), MessageKind::Switch) => {
            Some(Message::Switch((v >= options.on_threshold) as u8))
        }
        (Message::Switch(v), MessageKind::Int8) => Some(Message::Int8(v as i8)),
        (Message::Int8(v), MessageKind::Switch) => Some(Message::Switch((v != 0) as u8)),
        (Message::FloatCommand(v, c), MessageKind::Float) => {
            let _ = c;
            Some(Message::Float(v))
        }
        (Message::FloatTransition(v, ..), MessageKind::Float) => Some(Message::Float(v)),
        (Message::FloatTransition(v, c, _), MessageKind::FloatCommand) => {
            Some(Message::FloatCommand(v, c))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_category_match_passes_through_unchanged() {
        let options = ConvertOptions::default();
        let out =
            convert(Category::BinaryButton, Category::BinaryButton, Message::Switch(1), options);
        assert_eq!(out, Some(Message::Switch(1)));
    }

    #[test]
    fn contact_downcasts_to_button() {
        let options = ConvertOptions::default();
        let out =
            convert(Category::BinaryContact, Category::BinaryButton, Message::Switch(1), options);
        assert_eq!(out, Some(Message::Switch(1)));
    }

    #[test]
    fn setpoint_downcasts_to_temperature() {
        let rule = match_rule(Category::PhysicalTemperatureSetpoint, Category::PhysicalTemperature);
        assert_eq!(rule, MatchRule::DownCast);
    }

    #[test]
    fn switch_coerces_to_float_and_back() {
        let options = ConvertOptions::default();
        let up = convert(
            Category::BinaryButton,
            Category::MeteringElectric,
            Message::Switch(1),
            options,
        );
        assert_eq!(up, Some(Message::Float(1.0)));

        let down = convert(
            Category::MeteringElectric,
            Category::BinaryButton,
            Message::Float(0.9),
            options,
        );
        assert_eq!(down, Some(Message::Switch(1)));
    }

    #[test]
    fn unrelated_categories_are_rejected() {
        let options = ConvertOptions::default();
        let out =
            convert(Category::MeteringWater, Category::LevelControl, Message::Float(1.0), options);
        assert_eq!(out, None);
    }
}
