//! USB-HID glue
//!
//! Report descriptor, the SET_REPORT handler feeding host chunks into the
//! pendant task, and the transport carrying input reports back out.

use core::sync::atomic::Ordering;

use defmt::*;
use embassy_usb::class::hid::{ReportId, RequestHandler};
use embassy_usb::control::OutResponse;
use embassy_usb::Handler;
use xhc_core::{HidTransport, TransportError};
use xhc_protocol::{RawChunk, CHUNK_REPORT_ID, CHUNK_SIZE, INPUT_REPORT_ID, INPUT_REPORT_LEN};

use crate::channels::{CHUNKS, OUTBOUND, USB_CONFIGURED};

/// Vendor-defined collection: one input report, one feature report
#[rustfmt::skip]
pub const REPORT_DESCRIPTOR: &[u8] = &[
    0x06, 0x00, 0xFF,       // Usage Page (Vendor Defined 0xFF00)
    0x09, 0x01,             // Usage (0x01)
    0xA1, 0x01,             // Collection (Application)
    0x15, 0x00,             //   Logical Minimum (0)
    0x26, 0xFF, 0x00,       //   Logical Maximum (255)
    0x75, 0x08,             //   Report Size (8)

    0x85, INPUT_REPORT_ID,  //   Report ID
    0x95, (INPUT_REPORT_LEN - 1) as u8, // Report Count: buttons, selector, delta, key
    0x09, 0x01,             //   Usage (0x01)
    0x81, 0x02,             //   Input (Data, Var, Abs)

    0x85, CHUNK_REPORT_ID,  //   Report ID
    0x95, CHUNK_SIZE as u8, //   Report Count: one chunk
    0x09, 0x01,             //   Usage (0x01)
    0xB1, 0x02,             //   Feature (Data, Var, Abs)
    0xC0,                   // End Collection
];

/// Strip the report id some hosts leave in front of the chunk
fn chunk_payload(data: &[u8]) -> &[u8] {
    match data {
        [CHUNK_REPORT_ID, rest @ ..] if rest.len() == CHUNK_SIZE => rest,
        _ => data,
    }
}

/// Handles host SET_REPORT requests
pub struct ChunkHandler;

impl RequestHandler for ChunkHandler {
    fn get_report(&mut self, id: ReportId, _buf: &mut [u8]) -> Option<usize> {
        trace!("GET_REPORT {:?} ignored", id);
        None
    }

    fn set_report(&mut self, id: ReportId, data: &[u8]) -> OutResponse {
        match id {
            ReportId::Feature(CHUNK_REPORT_ID) => {}
            other => {
                debug!("SET_REPORT {:?} rejected", other);
                return OutResponse::Rejected;
            }
        }

        let Ok(chunk) = RawChunk::try_from(chunk_payload(data)) else {
            warn!("chunk of {} bytes rejected", data.len());
            return OutResponse::Rejected;
        };

        // Dropping is safe: reassembly resynchronizes on the next marker
        if CHUNKS.try_send(chunk).is_err() {
            warn!("chunk queue full, chunk dropped");
        }
        OutResponse::Accepted
    }
}

/// Tracks the USB configuration state
pub struct DeviceState;

impl Handler for DeviceState {
    fn configured(&mut self, configured: bool) {
        USB_CONFIGURED.store(configured, Ordering::Relaxed);
        if configured {
            info!("USB configured");
        } else {
            info!("USB deconfigured");
        }
    }
}

/// Queues input reports for the HID writer task
pub struct ChannelTransport;

impl HidTransport for ChannelTransport {
    fn send_report(&mut self, report: &[u8; INPUT_REPORT_LEN]) -> Result<(), TransportError> {
        if !USB_CONFIGURED.load(Ordering::Relaxed) {
            return Err(TransportError::Disconnected);
        }
        OUTBOUND
            .try_send(*report)
            .map_err(|_| TransportError::Busy)
    }
}
