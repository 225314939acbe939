// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cluster library: attribute read/write and the on/off, level,
//! colour, and thermostat clusters a coordinator for battery switches
//! and lights needs to recognise. Grounded in `protocol/src/zcl.hpp`.

use bitflags::bitflags;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cluster {
    Basic = 0x0000,
    PowerConfiguration = 0x0001,
    Identify = 0x0003,
    Groups = 0x0004,
    Scenes = 0x0005,
    OnOff = 0x0006,
    LevelControl = 0x0008,
    OtaUpgrade = 0x0019,
    GreenPower = 0x0021,
    Thermostat = 0x0201,
    ColorControl = 0x0300,
    ZllCommissioning = 0x1000,
}

impl Cluster {
    pub fn from_u16(v: u16) -> Option<Cluster> {
        Some(match v {
            0x0000 => Cluster::Basic,
            0x0001 => Cluster::PowerConfiguration,
            0x0003 => Cluster::Identify,
            0x0004 => Cluster::Groups,
            0x0005 => Cluster::Scenes,
            0x0006 => Cluster::OnOff,
            0x0008 => Cluster::LevelControl,
            0x0019 => Cluster::OtaUpgrade,
            0x0021 => Cluster::GreenPower,
            0x0201 => Cluster::Thermostat,
            0x0300 => Cluster::ColorControl,
            0x1000 => Cluster::ZllCommissioning,
            _ => return None,
        })
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FrameControl: u8 {
        const TYPE_CLUSTER_SPECIFIC = 1 << 0;
        const MANUFACTURER_SPECIFIC = 1 << 2;
        const DIRECTION_SERVER_TO_CLIENT = 1 << 3;
        const DISABLE_DEFAULT_RESPONSE = 1 << 4;
    }
}

impl FrameControl {
    pub fn is_cluster_specific(self) -> bool {
        self.contains(FrameControl::TYPE_CLUSTER_SPECIFIC)
    }
}

/// Profile-wide commands, valid against any cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ReadAttributes = 0x00,
    ReadAttributesResponse = 0x01,
    WriteAttributes = 0x02,
    WriteAttributesResponse = 0x04,
    ConfigureReporting = 0x06,
    ConfigureReportingResponse = 0x07,
    ReportAttributes = 0x0a,
    DefaultResponse = 0x0b,
    DiscoverAttributes = 0x0c,
    DiscoverAttributesResponse = 0x0d,
}

impl Command {
    pub fn from_byte(b: u8) -> Option<Command> {
        Some(match b {
            0x00 => Command::ReadAttributes,
            0x01 => Command::ReadAttributesResponse,
            0x02 => Command::WriteAttributes,
            0x04 => Command::WriteAttributesResponse,
            0x06 => Command::ConfigureReporting,
            0x07 => Command::ConfigureReportingResponse,
            0x0a => Command::ReportAttributes,
            0x0b => Command::DefaultResponse,
            0x0c => Command::DiscoverAttributes,
            0x0d => Command::DiscoverAttributesResponse,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success = 0x00,
    UnsupportedAttribute = 0x86,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnOffCommand {
    Off = 0x00,
    On = 0x01,
    Toggle = 0x02,
}

impl OnOffCommand {
    pub fn from_byte(b: u8) -> Option<OnOffCommand> {
        match b {
            0x00 => Some(OnOffCommand::Off),
            0x01 => Some(OnOffCommand::On),
            0x02 => Some(OnOffCommand::Toggle),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelControlCommand {
    MoveToLevel = 0x00,
    Move = 0x01,
    Step = 0x02,
    Stop = 0x03,
    MoveToLevelWithOnOff = 0x04,
}

impl LevelControlCommand {
    pub fn from_byte(b: u8) -> Option<LevelControlCommand> {
        match b {
            0x00 => Some(LevelControlCommand::MoveToLevel),
            0x01 => Some(LevelControlCommand::Move),
            0x02 => Some(LevelControlCommand::Step),
            0x03 => Some(LevelControlCommand::Stop),
            0x04 => Some(LevelControlCommand::MoveToLevelWithOnOff),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorControlCommand {
    MoveToColor = 0x07,
    MoveColor = 0x08,
    StepColor = 0x09,
}

impl ColorControlCommand {
    pub fn from_byte(b: u8) -> Option<ColorControlCommand> {
        match b {
            0x07 => Some(ColorControlCommand::MoveToColor),
            0x08 => Some(ColorControlCommand::MoveColor),
            0x09 => Some(ColorControlCommand::StepColor),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThermostatAttribute {
    LocalTemperature = 0x0000,
    OccupiedCoolingSetpoint = 0x0011,
    OccupiedHeatingSetpoint = 0x0012,
    SystemMode = 0x001c,
}

/// Recognised cluster-specific commands. Anything not matched here is
/// unknown and should be met with a `DEFAULT_RESPONSE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recognized {
    ReadAttributes,
    OnOff(OnOffCommand),
    LevelControl(LevelControlCommand),
    ColorControl(ColorControlCommand),
}

pub fn recognize(cluster: Cluster, frame_control: FrameControl, command: u8) -> Option<Recognized> {
    if !frame_control.is_cluster_specific() {
        if command == Command::ReadAttributes as u8 {
            return Some(Recognized::ReadAttributes);
        }
        return None;
    }
    match cluster {
        Cluster::OnOff => OnOffCommand::from_byte(command).map(Recognized::OnOff),
        Cluster::LevelControl => LevelControlCommand::from_byte(command).map(Recognized::LevelControl),
        Cluster::ColorControl => ColorControlCommand::from_byte(command).map(Recognized::ColorControl),
        _ => None,
    }
}

/// Builds the body of a profile-wide `DEFAULT_RESPONSE` for an
/// unrecognised cluster/command pair.
pub fn default_response(command: u8, status: Status) -> Vec<u8> {
    vec![Command::DefaultResponse as u8, command, status as u8]
}
