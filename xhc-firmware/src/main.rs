//! XHC Pendant Firmware
//!
//! Firmware for a WHB04-style USB CNC pendant (STM32F072CB + ST7735 TFT).
//! The host writes its machine state as feature-report chunks; the pendant
//! shows it on the panel and answers with keepalive input reports.

#![no_std]
#![no_main]

mod channels;
mod hid;
mod st7735;

use defmt::*;
use embassy_executor::Spawner;
use embassy_futures::select::{select, Either};
use embassy_stm32::gpio::{Level, Output, Speed};
use embassy_stm32::mode::Blocking;
use embassy_stm32::peripherals::USB;
use embassy_stm32::spi::{self, Spi};
use embassy_stm32::time::Hertz;
use embassy_stm32::usb::{self, Driver};
use embassy_stm32::{bind_interrupts, peripherals};
use embassy_time::{Delay, Duration, Instant, Ticker};
use embassy_usb::class::hid::{
    Config as HidConfig, HidBootProtocol, HidSubclass, HidWriter, State,
};
use embassy_usb::{Builder, UsbDevice};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use crate::channels::{CHUNKS, OUTBOUND};
use crate::hid::{ChannelTransport, ChunkHandler, DeviceState, REPORT_DESCRIPTOR};
use crate::st7735::St7735;
use xhc_core::{Pendant, PendantError, TransportError};
use xhc_display::GraphicsBackend;
use xhc_protocol::{PRODUCT_ID, VENDOR_ID};

bind_interrupts!(struct Irqs {
    USB => usb::InterruptHandler<peripherals::USB>;
});

/// Panel on SPI1 with GPIO chip select, data/command and reset
type Panel = St7735<Spi<'static, Blocking, spi::mode::Master>, Output<'static>, Output<'static>, Output<'static>>;

type UsbDriver = Driver<'static, USB>;

/// Pendant tick: keepalive and link timeout checks
const POLL_INTERVAL_MS: u64 = 10;

/// Interrupt IN packet size; an input report is 6 bytes
const HID_PACKET_SIZE: usize = 8;

static CONFIG_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static BOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static CONTROL_BUF: StaticCell<[u8; 64]> = StaticCell::new();
static HID_STATE: StaticCell<State<'static>> = StaticCell::new();
static CHUNK_HANDLER: StaticCell<ChunkHandler> = StaticCell::new();
static DEVICE_STATE: StaticCell<DeviceState> = StaticCell::new();

/// Millisecond tick shared by every timing decision
///
/// Truncation to 32 bits is fine: all comparisons use wrapping arithmetic.
fn now_ms() -> u32 {
    Instant::now().as_millis() as u32
}

fn clock_config() -> embassy_stm32::Config {
    use embassy_stm32::rcc::*;

    // Crystal-less USB: HSI48 trimmed by the CRS from USB SOF
    let mut config = embassy_stm32::Config::default();
    config.rcc.hsi48 = Some(Hsi48Config { sync_from_usb: true });
    config.rcc.sys = Sysclk::HSI48;
    config
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("XHC pendant firmware starting...");

    let p = embassy_stm32::init(clock_config());

    // Setup SPI for the TFT (PA5=SCK, PA7=MOSI, PA4=CS, PB0=DC, PB1=RST)
    let mut spi_config = spi::Config::default();
    spi_config.frequency = Hertz(12_000_000);
    let spi = Spi::new_blocking_txonly(p.SPI1, p.PA5, p.PA7, spi_config);

    let mut panel = St7735::new(
        spi,
        Output::new(p.PA4, Level::High, Speed::VeryHigh),
        Output::new(p.PB0, Level::Low, Speed::VeryHigh),
        Output::new(p.PB1, Level::High, Speed::Low),
    );
    if let Err(e) = panel.init(&mut Delay) {
        error!("Failed to initialize panel: {:?}", e);
    } else {
        info!("TFT initialized");
    }

    // Setup USB (PA12=DP, PA11=DM)
    let driver = Driver::new(p.USB, Irqs, p.PA12, p.PA11);

    let mut usb_config = embassy_usb::Config::new(VENDOR_ID, PRODUCT_ID);
    usb_config.manufacturer = Some("XHC");
    usb_config.product = Some("WHB04B pendant");
    usb_config.max_power = 100;
    usb_config.max_packet_size_0 = 64;

    let mut builder = Builder::new(
        driver,
        usb_config,
        CONFIG_DESCRIPTOR.init([0; 256]),
        BOS_DESCRIPTOR.init([0; 256]),
        &mut [],
        CONTROL_BUF.init([0; 64]),
    );
    builder.handler(DEVICE_STATE.init(DeviceState));

    let hid_config = HidConfig {
        report_descriptor: REPORT_DESCRIPTOR,
        request_handler: Some(CHUNK_HANDLER.init(ChunkHandler)),
        poll_ms: POLL_INTERVAL_MS as u8,
        max_packet_size: HID_PACKET_SIZE as u16,
        hid_subclass: HidSubclass::No,
        hid_boot_protocol: HidBootProtocol::None,
    };
    let writer = HidWriter::<_, HID_PACKET_SIZE>::new(
        &mut builder,
        HID_STATE.init(State::new()),
        hid_config,
    );
    let usb = builder.build();

    // Spawn tasks
    spawner.spawn(usb_task(usb)).unwrap();
    spawner.spawn(hid_tx_task(writer)).unwrap();
    spawner.spawn(pendant_task(panel)).unwrap();

    info!("All tasks spawned");
}

/// USB device task - enumeration and control requests
#[embassy_executor::task]
async fn usb_task(mut usb: UsbDevice<'static, UsbDriver>) -> ! {
    info!("USB task started");
    usb.run().await
}

/// HID transmit task - writes queued input reports to the IN endpoint
#[embassy_executor::task]
async fn hid_tx_task(mut writer: HidWriter<'static, UsbDriver, HID_PACKET_SIZE>) {
    info!("HID TX task started");

    loop {
        let report = OUTBOUND.receive().await;
        writer.ready().await;
        match writer.write(&report).await {
            Ok(()) => trace!("Sent input report"),
            Err(e) => warn!("HID write failed: {:?}", e),
        }
    }
}

/// Pendant task - sole owner of reassembly, render and send state
#[embassy_executor::task]
async fn pendant_task(panel: Panel) {
    info!("Pendant task started");

    let mut display = GraphicsBackend::new(panel);
    let mut transport = ChannelTransport;
    let mut pendant = Pendant::default();

    if let Err(e) = pendant.start(&mut display) {
        error!("Failed to draw static screen: {:?}", e);
    }

    let mut ticker = Ticker::every(Duration::from_millis(POLL_INTERVAL_MS));

    loop {
        match select(CHUNKS.receive(), ticker.next()).await {
            Either::First(chunk) => {
                if let Err(e) = pendant.on_chunk(&chunk, now_ms(), &mut display) {
                    warn!("Render failed: {:?}", e);
                }
            }
            Either::Second(()) => match pendant.poll(now_ms(), &mut transport, &mut display) {
                Ok(_) => {}
                // Expected until the host configures the device
                Err(PendantError::Transport(TransportError::Disconnected)) => {}
                Err(e) => warn!("Poll failed: {:?}", e),
            },
        }
    }
}
