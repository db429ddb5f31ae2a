//! USB command frames for Fineoffset stations.
//!
//! The station is a HID device that takes 8-byte control transfers. Every
//! command is repeated twice inside the frame, with `0x20` (the transfer
//! size) as terminator. A read returns 32 bytes; a write is answered with
//! eight [`ACK_BYTE`]s.

use bytes::BufMut;

use wsp_types::layout::BLOCK_SIZE;

/// USB vendor id of the station's HID interface.
pub const USB_VENDOR_ID: u16 = 0x1941;

/// USB product id of the station's HID interface.
pub const USB_PRODUCT_ID: u16 = 0x8021;

/// Read 32 bytes.
/// Format: `[READ_BLOCK, hi, lo, 0x20, READ_BLOCK, 0, 0, 0x20]`
pub const READ_BLOCK: u8 = 0xA1;

/// Write 32 bytes, followed by the data.
/// Format: `[WRITE_BLOCK, hi, lo, 0x20, WRITE_BLOCK, 0, 0, 0x20]`
pub const WRITE_BLOCK: u8 = 0xA0;

/// Write one byte.
/// Format: `[WRITE_BYTE, hi, lo, 0x20, WRITE_BYTE, data, 0, 0x20]`
pub const WRITE_BYTE: u8 = 0xA2;

/// Frame terminator, also the transfer size.
pub const END_MARK: u8 = 0x20;

/// Every byte of a write acknowledgement.
pub const ACK_BYTE: u8 = 0xA5;

/// Length of a write acknowledgement.
pub const ACK_LENGTH: usize = 8;

/// Length of a command frame.
pub const FRAME_LENGTH: usize = 8;

fn frame(command: u8, address: u16, data: u8) -> [u8; FRAME_LENGTH] {
    let [hi, lo] = address.to_be_bytes();
    [command, hi, lo, END_MARK, command, data, 0, END_MARK]
}

/// Frame requesting the 32 bytes at `address`.
#[must_use]
pub fn read_frame(address: u16) -> [u8; FRAME_LENGTH] {
    frame(READ_BLOCK, address, 0)
}

/// Frame writing one byte.
#[must_use]
pub fn write_byte_frame(address: u16, value: u8) -> [u8; FRAME_LENGTH] {
    frame(WRITE_BYTE, address, value)
}

/// Frame writing 32 bytes, command followed by payload.
#[must_use]
pub fn write_block_frame(address: u16, data: &[u8; BLOCK_SIZE]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(FRAME_LENGTH + BLOCK_SIZE);
    buf.put_slice(&frame(WRITE_BLOCK, address, 0));
    buf.put_slice(data);
    buf
}

/// Whether `response` is a write acknowledgement.
#[must_use]
pub fn is_ack(response: &[u8]) -> bool {
    response.len() == ACK_LENGTH && response.iter().all(|b| *b == ACK_BYTE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_values() {
        assert_eq!(READ_BLOCK, 0xA1);
        assert_eq!(WRITE_BLOCK, 0xA0);
        assert_eq!(WRITE_BYTE, 0xA2);
        assert_eq!(END_MARK, 0x20);
        assert_eq!(ACK_BYTE, 0xA5);
    }

    #[test]
    fn test_read_frame() {
        assert_eq!(
            read_frame(0x1234),
            [0xA1, 0x12, 0x34, 0x20, 0xA1, 0x00, 0x00, 0x20]
        );
    }

    #[test]
    fn test_write_byte_frame() {
        assert_eq!(
            write_byte_frame(0x001A, 0xAA),
            [0xA2, 0x00, 0x1A, 0x20, 0xA2, 0xAA, 0x00, 0x20]
        );
    }

    #[test]
    fn test_write_block_frame() {
        let data = [0x5A; BLOCK_SIZE];
        let frame = write_block_frame(0x0100, &data);
        assert_eq!(frame.len(), 40);
        assert_eq!(&frame[..8], &[0xA0, 0x01, 0x00, 0x20, 0xA0, 0x00, 0x00, 0x20]);
        assert!(frame[8..].iter().all(|b| *b == 0x5A));
    }

    #[test]
    fn test_is_ack() {
        assert!(is_ack(&[ACK_BYTE; 8]));
        assert!(!is_ack(&[ACK_BYTE; 7]));
        assert!(!is_ack(&[0xA5, 0xA5, 0xA5, 0x00, 0xA5, 0xA5, 0xA5, 0xA5]));
    }
}
