// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Emulator host binary (C9): ties the task runtime, the bus/radio link
//! drivers, the flash/FeRAM stores, and the publish/subscribe plane
//! together behind one process, per spec.md §6's `<local-port> <remote-
//! port>` CLI contract and SPEC_FULL.md §4.9.

mod config;
mod emu_medium;
mod mqttsn_codec;
mod persistent_counter;
mod radio_record;
mod storage_file;
mod transport_udp;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use bus_link::{BusDeviceRecord, BusMaster, DeviceState, RosterEntry};
use config::BoardConfig;
use emu_medium::{FileFeram, FileFlash};
use feram_store::FeramStore;
use flash_store::{Store, TypedArray};
use persistent_counter::PersistentCounter;
use radio_link::{Coordinator, FilterContext, FilterFlags};
use radio_record::RadioDeviceRecord;
use runtime::Executor;
use transport_udp::{UdpBusTransport, UdpRadioTransport};

#[derive(Parser, Debug)]
#[clap(name = "room-control", about = "Emulator host for the task runtime and link-layer drivers")]
struct Cli {
    /// Local UDP port the bus/radio transports bind, per spec.md §6.
    #[clap(default_value_t = 1337)]
    local_port: u16,
    /// Remote UDP port bus/radio frames are addressed to.
    #[clap(default_value_t = 1337)]
    remote_port: u16,
    /// Board configuration TOML; defaults are used when omitted.
    #[clap(long)]
    config: Option<PathBuf>,
    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Dump a flash array store file's contents.
    InspectFlash {
        file: PathBuf,
        #[clap(long, default_value_t = 2)]
        array_count: usize,
        #[clap(long, default_value_t = 4096)]
        page_size: usize,
        #[clap(long, default_value_t = 8)]
        page_count: usize,
        /// Also write every record out in the concatenated storage-file
        /// format named in spec.md §6, for external inspection.
        #[clap(long)]
        export: Option<PathBuf>,
    },
    /// Dump a FeRAM counter store file's contents.
    InspectFeram {
        file: PathBuf,
        #[clap(long)]
        element_count: usize,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Some(Command::InspectFlash { file, array_count, page_size, page_count, export }) => {
            inspect_flash(&file, array_count, page_size, page_count, export.as_deref())
        }
        Some(Command::InspectFeram { file, element_count }) => inspect_feram(&file, element_count),
        None => run(cli.local_port, cli.remote_port, cli.config.as_deref()),
    }
}

fn inspect_flash(
    file: &std::path::Path,
    array_count: usize,
    page_size: usize,
    page_count: usize,
    export: Option<&std::path::Path>,
) -> anyhow::Result<()> {
    let medium = FileFlash::open(file, page_size, page_count)?;
    let store = Store::open(medium, array_count).map_err(|e| anyhow::anyhow!("{e}"))?;
    let mut records = Vec::new();
    for array_index in 0..array_count {
        println!("array {array_index}: {} live records", store.count(array_index));
        for (index, bytes) in store.iter(array_index).enumerate() {
            println!("  [{index}] {} bytes: {:02x?}", bytes.len(), bytes);
            records.push(storage_file::Record {
                id: ((array_index as u16) << 8) | index as u16,
                data: bytes.to_vec(),
            });
        }
    }
    if let Some(export) = export {
        let out = std::fs::File::create(export)?;
        storage_file::write_records(out, &records)?;
    }
    Ok(())
}

fn inspect_feram(file: &std::path::Path, element_count: usize) -> anyhow::Result<()> {
    let medium = FileFeram::open(file, element_count * 10)?;
    let store = FeramStore::open(medium, element_count).map_err(|e| anyhow::anyhow!("{e}"))?;
    for index in 0..element_count {
        match store.read(index) {
            Ok((size, payload)) => println!("[{index}] size={size} {:02x?}", &payload[..size as usize]),
            Err(e) => println!("[{index}] {e}"),
        }
    }
    Ok(())
}

/// Loads the bus device roster + its replay counters back from the flash
/// and FeRAM stores so a restart resumes without re-commissioning, per
/// spec.md §8 scenario 1 ("After restart, a read-request ... is answered").
fn restore_bus_roster<M: flash_store::FlashMedium, F: feram_store::FeramMedium>(
    flash: &mut Store<M>,
    feram: &mut FeramStore<F>,
) -> anyhow::Result<Vec<RosterEntry>> {
    let array: TypedArray<'_, M, BusDeviceRecord> =
        TypedArray::new(flash, BoardConfig::BUS_ROSTER_ARRAY);
    let mut entries = Vec::with_capacity(array.count());
    for index in 0..array.count() {
        let Some(record) = array.get(index) else { continue };
        let rx_counter = PersistentCounter::new(feram, index * 2).read()?;
        let tx_counter = PersistentCounter::new(feram, index * 2 + 1).read()?;
        let state = if record.is_commissioned() { DeviceState::Ready } else { DeviceState::Enumerated };
        entries.push(RosterEntry { record, state, rx_counter, tx_counter });
    }
    Ok(entries)
}

fn persist_bus_roster<M: flash_store::FlashMedium, F: feram_store::FeramMedium>(
    flash: &mut Store<M>,
    feram: &mut FeramStore<F>,
    roster: &[RosterEntry],
) -> anyhow::Result<()> {
    let mut array: TypedArray<'_, M, BusDeviceRecord> =
        TypedArray::new(flash, BoardConfig::BUS_ROSTER_ARRAY);
    for (index, entry) in roster.iter().enumerate() {
        array.write(index, &entry.record).map_err(|e| anyhow::anyhow!("{e}"))?;
        PersistentCounter::new(feram, index * 2).write(entry.rx_counter)?;
        PersistentCounter::new(feram, index * 2 + 1).write(entry.tx_counter)?;
    }
    Ok(())
}

fn restore_radio_roster<M: flash_store::FlashMedium>(
    flash: &mut Store<M>,
) -> Vec<radio_link::GreenPowerRegistration> {
    let array: TypedArray<'_, M, RadioDeviceRecord> =
        TypedArray::new(flash, BoardConfig::RADIO_ROSTER_ARRAY);
    (0..array.count()).filter_map(|i| array.get(i)).map(Into::into).collect()
}

fn persist_radio_roster<M: flash_store::FlashMedium>(
    flash: &mut Store<M>,
    registrations: &[radio_link::GreenPowerRegistration],
) -> anyhow::Result<()> {
    let mut array: TypedArray<'_, M, RadioDeviceRecord> =
        TypedArray::new(flash, BoardConfig::RADIO_ROSTER_ARRAY);
    for (index, reg) in registrations.iter().enumerate() {
        let record: RadioDeviceRecord = reg.into();
        array.write(index, &record).map_err(|e| anyhow::anyhow!("{e}"))?;
    }
    Ok(())
}

fn run(local_port: u16, remote_port: u16, config_path: Option<&std::path::Path>) -> anyhow::Result<()> {
    let config = BoardConfig::load(config_path)?;

    let flash_medium = FileFlash::open(&config.flash_file, config.flash_page_size, config.flash_page_count)?;
    let mut flash = Store::open(flash_medium, config.flash_array_count).map_err(|e| anyhow::anyhow!("{e}"))?;
    let feram_medium = FileFeram::open(&config.feram_file, config.feram_element_count * 10)?;
    let mut feram =
        FeramStore::open(feram_medium, config.feram_element_count).map_err(|e| anyhow::anyhow!("{e}"))?;

    let bus_roster = restore_bus_roster(&mut flash, &mut feram)?;
    let radio_roster = restore_radio_roster(&mut flash);

    let bus_transport = UdpBusTransport::bind(local_port, remote_port)?;
    let mut bus_master = BusMaster::new(bus_transport);
    bus_master.restore(bus_roster);

    let radio_transport = UdpRadioTransport::bind(local_port, remote_port)?;
    let contexts = vec![
        FilterContext::new(FilterFlags::DEST_SHORT | FilterFlags::HANDLE_ACK, config.bus_pan_id, 0x0000),
        FilterContext::new(FilterFlags::TYPE_DATA_DEST_SHORT, config.bus_pan_id, 0x0000),
    ];
    let mut coordinator = Coordinator::new(radio_transport, contexts);
    coordinator.restore_green_power(radio_roster);

    let mut bridge = pubsub::MqttSnBridge::new();
    bridge.connect(config.mqttsn_client_id.as_bytes(), config.mqttsn_keep_alive_s);

    let executor = Executor::new();
    eprintln!("room-control listening on 127.0.0.1:{local_port}, peer 127.0.0.1:{remote_port}");

    let mut ticks = 0u32;
    loop {
        match bus_master.poll_read() {
            Ok(Some((addr, endpoint_index, value))) => {
                eprintln!("bus: {addr} endpoint {endpoint_index} -> {value:?}");
            }
            Ok(None) => {}
            Err(e) => eprintln!("bus: {e}"),
        }

        match coordinator.poll() {
            Ok(_) | Err(radio_link::RadioError::FilterRejected) => {}
            Err(e) => eprintln!("radio: {e}"),
        }

        if let Some(frame) = bridge.poll_outgoing() {
            eprintln!("mqtt-sn: {:?}", mqttsn_codec::encode(&frame));
        }
        bridge.tick();
        executor.run_until_idle();

        ticks += 1;
        if ticks % 50 == 0 {
            persist_bus_roster(&mut flash, &mut feram, bus_master.roster())?;
            persist_radio_roster(&mut flash, coordinator.green_power_registrations())?;
            bus_link::BUS_EVENTS.dump("bus");
            radio_link::RADIO_EVENTS.dump("radio");
            pubsub::PUBSUB_EVENTS.dump("pubsub");
        }

        std::thread::sleep(std::time::Duration::from_millis(10));
    }
}
