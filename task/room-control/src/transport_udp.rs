// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! UDP-backed transports for the bus and radio link drivers, so the
//! emulator can actually exchange frames over the network per spec.md §6's
//! `<local-port> <remote-port>` CLI contract. Each driver gets its own
//! socket, bound one port apart (`local_port` for the bus, `local_port + 1`
//! for the radio), since nothing in spec.md names a shared framing for the
//! two link layers on one socket.

use std::net::UdpSocket;
use std::time::Duration;

use bus_link::BusTransport;
use radio_link::RadioTransport;

const BUS_PORT_OFFSET: u16 = 0;
const RADIO_PORT_OFFSET: u16 = 1;
const REPLY_TIMEOUT: Duration = Duration::from_millis(200);
const POLL_TIMEOUT: Duration = Duration::from_millis(10);

fn bind_connected(local_port: u16, remote_port: u16, timeout: Duration) -> std::io::Result<UdpSocket> {
    let socket = UdpSocket::bind(("127.0.0.1", local_port))?;
    socket.connect(("127.0.0.1", remote_port))?;
    socket.set_read_timeout(Some(timeout))?;
    Ok(socket)
}

pub struct UdpBusTransport {
    socket: UdpSocket,
}

impl UdpBusTransport {
    pub fn bind(local_port: u16, remote_port: u16) -> std::io::Result<Self> {
        let socket = bind_connected(
            local_port + BUS_PORT_OFFSET,
            remote_port + BUS_PORT_OFFSET,
            REPLY_TIMEOUT,
        )?;
        Ok(UdpBusTransport { socket })
    }
}

impl BusTransport for UdpBusTransport {
    fn transfer(&mut self, write: &[u8]) -> Vec<u8> {
        let _ = self.socket.send(write);
        let mut buf = [0u8; 512];
        match self.socket.recv(&mut buf) {
            Ok(len) => buf[..len].to_vec(),
            Err(_) => Vec::new(),
        }
    }
}

pub struct UdpRadioTransport {
    socket: UdpSocket,
}

impl UdpRadioTransport {
    pub fn bind(local_port: u16, remote_port: u16) -> std::io::Result<Self> {
        let socket = bind_connected(
            local_port + RADIO_PORT_OFFSET,
            remote_port + RADIO_PORT_OFFSET,
            POLL_TIMEOUT,
        )?;
        Ok(UdpRadioTransport { socket })
    }
}

impl RadioTransport for UdpRadioTransport {
    fn send(&mut self, frame: &[u8]) {
        let _ = self.socket.send(frame);
    }

    fn receive(&mut self) -> Option<Vec<u8>> {
        let mut buf = [0u8; 256];
        match self.socket.recv(&mut buf) {
            Ok(len) => Some(buf[..len].to_vec()),
            Err(_) => None,
        }
    }
}
