use std::collections::BTreeSet;

use btleplug::{
    api::{
        Central, CentralEvent, Characteristic as GattCharacteristic, Manager as _, Peripheral as _,
        ScanFilter, WriteType,
    },
    platform::{Adapter, Manager, Peripheral},
};
use lywsd02_clock::{
    Error, Result,
    link::{LinkExecutor, execute_writes},
    lywsd02::{Characteristic, EncodedWrite},
    request::SetTimePlan,
};
use macaddr::MacAddr6;
use tokio::time::{Duration, Instant, timeout, timeout_at};
use tokio_stream::{Stream, StreamExt as _};
use tracing::{debug, info, warn};

const DISCONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const STOP_SCAN_TIMEOUT: Duration = Duration::from_secs(5);

struct BtleplugLink<'a> {
    peripheral: &'a Peripheral,
    characteristics: BTreeSet<GattCharacteristic>,
}

impl LinkExecutor for BtleplugLink<'_> {
    async fn write(&mut self, target: Characteristic, bytes: &[u8]) -> Result<()> {
        let uuid = target.uuid();
        let characteristic = self
            .characteristics
            .iter()
            .find(|c| c.uuid == uuid)
            .ok_or(Error::CharacteristicNotFound(uuid))?;

        self.peripheral
            .write(characteristic, bytes, WriteType::WithResponse)
            .await
            .map_err(Error::link("writing characteristic"))
    }
}

/// Runs the whole device conversation under `plan.timeout`.
///
/// Once a connection has been attempted the device is always disconnected,
/// whatever the outcome of the writes.
pub async fn set_time(plan: &SetTimePlan) -> Result<()> {
    let deadline = Instant::now() + plan.timeout;

    let manager = Manager::new()
        .await
        .map_err(Error::link("initializing Bluetooth manager"))?;

    let adapter = manager
        .adapters()
        .await
        .map_err(Error::link("listing Bluetooth adapters"))?
        .into_iter()
        .next()
        .ok_or(Error::NoAdapter)?;

    let peripheral = find_device(&adapter, plan.device, deadline, plan.timeout).await?;

    info!(device = %plan.device, "found device, updating time");

    let result = timeout_at(deadline, converse(&peripheral, &plan.writes))
        .await
        .unwrap_or(Err(Error::LinkTimeout(plan.timeout)));

    match timeout(DISCONNECT_TIMEOUT, peripheral.disconnect()).await {
        Ok(Ok(())) => debug!(device = %plan.device, "disconnected"),
        Ok(Err(err)) => warn!(device = %plan.device, "failed to disconnect: {err:#}"),
        Err(_) => warn!(device = %plan.device, "timed out disconnecting"),
    }

    result
}

async fn converse(peripheral: &Peripheral, writes: &[EncodedWrite]) -> Result<()> {
    peripheral
        .connect()
        .await
        .map_err(Error::link("connecting"))?;

    peripheral
        .discover_services()
        .await
        .map_err(Error::link("discovering services"))?;

    let mut link = BtleplugLink {
        peripheral,
        characteristics: peripheral.characteristics(),
    };

    execute_writes(&mut link, writes).await
}

/// Scans until `device` shows up or `deadline` passes; the scan is stopped either way.
async fn find_device(
    adapter: &Adapter,
    device: MacAddr6,
    deadline: Instant,
    limit: Duration,
) -> Result<Peripheral> {
    let mut events = timeout_at(deadline, adapter.events())
        .await
        .map_err(|_| Error::LinkTimeout(limit))?
        .map_err(Error::link("subscribing to adapter events"))?;

    timeout_at(deadline, adapter.start_scan(ScanFilter::default()))
        .await
        .map_err(|_| Error::LinkTimeout(limit))?
        .map_err(Error::link("starting BLE scan"))?;

    let result = timeout_at(deadline, scan_for(adapter, &mut events, device))
        .await
        .unwrap_or_else(|_| Err(Error::LinkTimeout(limit)));

    match timeout(STOP_SCAN_TIMEOUT, adapter.stop_scan()).await {
        Ok(Ok(())) => debug!("stopped BLE scan"),
        Ok(Err(err)) => warn!("failed to stop BLE scan: {err:#}"),
        Err(_) => warn!("timed out stopping BLE scan"),
    }

    result
}

async fn scan_for(
    adapter: &Adapter,
    events: &mut (impl Stream<Item = CentralEvent> + Unpin),
    device: MacAddr6,
) -> Result<Peripheral> {
    let peripherals = adapter
        .peripherals()
        .await
        .map_err(Error::link("listing BLE peripherals"))?;

    if let Some(peripheral) = peripherals.into_iter().find(|p| address(p) == device) {
        return Ok(peripheral);
    }

    while let Some(event) = events.next().await {
        let (CentralEvent::DeviceDiscovered(id) | CentralEvent::DeviceUpdated(id)) = event else {
            continue;
        };

        let peripheral = adapter
            .peripheral(&id)
            .await
            .map_err(Error::link("getting BLE peripheral"))?;

        if address(&peripheral) == device {
            return Ok(peripheral);
        }
    }

    Err(Error::DeviceNotFound(device))
}

fn address(peripheral: &Peripheral) -> MacAddr6 {
    peripheral.address().into_inner().into()
}
