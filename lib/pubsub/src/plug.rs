// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Plug categories and the typed messages carried between them.
//!
//! The category list closed here is the concrete instantiation of the
//! family spec.md gestures at with "binary, ternary, metering, temperature,
//! level, color, ...": the set a real device roster actually needs, taken
//! from `node/src/Subscriber.cpp`'s `convertSwitch`/`convertInt8`/
//! `convertFloat*` family.

/// A publisher or subscriber's declared message category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    BinaryButton,
    BinaryContact,
    TernaryButton,
    MeteringElectric,
    MeteringWater,
    PhysicalTemperature,
    PhysicalTemperatureSetpoint,
    LevelControl,
    ColorControl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    In,
    Out,
}

/// The shape of value a category's messages carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Switch,
    Int8,
    Float,
    FloatCommand,
    FloatTransition,
}

impl Category {
    /// A category this one can down-cast to: a subscriber declared for the
    /// parent accepts publications from the child without coercion options,
    /// e.g. a generic `BINARY_BUTTON` subscriber accepts a `BINARY_CONTACT`
    /// or `TERNARY_BUTTON` publisher.
    pub fn parent(self) -> Option<Category> {
        match self {
            Category::BinaryContact => Some(Category::BinaryButton),
            Category::TernaryButton => Some(Category::BinaryButton),
            Category::PhysicalTemperatureSetpoint => Some(Category::PhysicalTemperature),
            _ => None,
        }
    }

    pub fn is_descendant_of(self, other: Category) -> bool {
        let mut cur = self;
        loop {
            if cur == other {
                return true;
            }
            match cur.parent() {
                Some(p) => cur = p,
                None => return false,
            }
        }
    }

    pub fn kind(self) -> MessageKind {
        match self {
            Category::BinaryButton | Category::BinaryContact => MessageKind::Switch,
            Category::TernaryButton => MessageKind::Int8,
            Category::MeteringElectric | Category::MeteringWater => MessageKind::Float,
            Category::PhysicalTemperature | Category::PhysicalTemperatureSetpoint => {
                MessageKind::Float
            }
            Category::LevelControl => MessageKind::FloatTransition,
            Category::ColorControl => MessageKind::FloatCommand,
        }
    }
}

/// A value in flight between plugs, tagged by the shape it carries. Replaces
/// the source firmware's per-kind `publishX`/`convertX` overload family with
/// a single sum type and one conversion function keyed on the destination's
/// [`MessageKind`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Message {
    Switch(u8),
    Int8(i8),
    Float(f32),
    FloatCommand(f32, u8),
    FloatTransition(f32, u8, u16),
}

impl Message {
    pub fn kind(self) -> MessageKind {
        match self {
            Message::Switch(_) => MessageKind::Switch,
            Message::Int8(_) => MessageKind::Int8,
            Message::Float(_) => MessageKind::Float,
            Message::FloatCommand(..) => MessageKind::FloatCommand,
            Message::FloatTransition(..) => MessageKind::FloatTransition,
        }
    }
}

/// Coercion parameters for category/switch/value conversions (rule 3).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvertOptions {
    /// Value a float must reach or exceed to read as switch-on.
    pub on_threshold: f32,
    /// Value substituted for a float destination when converting from a
    /// switch-on source (switch-off maps to 0.0).
    pub on_value: f32,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        ConvertOptions { on_threshold: 0.5, on_value: 1.0 }
    }
}
