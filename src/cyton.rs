use std::io::Read;
use std::time::Duration;
use crate::config::DeviceConfig;
use crate::error::SessionError;
use crate::source::{SampleBlock, SampleSource};
const BAUD_RATE: u32 = 115_200;
const FRAME_LEN: usize = 33;
const FRAME_HEADER: u8 = 0xA0;
const CYTON_CHANNELS: usize = 8;
const CMD_START: &[u8] = b"b";
const CMD_STOP: &[u8] = b"s";
// ADS1299 full-scale conversion: 4.5 V reference, gain 24, 24-bit signed.
const SCALE_UV: f64 = 4.5 / 24.0 / ((1 << 23) - 1) as f64 * 1_000_000.0;
/// OpenBCI Cyton over its USB serial dongle.
///
/// The dongle emits fixed 33-byte frames: 0xA0, a wrapping sample number,
/// eight 24-bit big-endian channel values, six aux bytes and a 0xC0..0xCF
/// footer. Bytes that do not frame correctly are skipped one at a time until
/// the stream re-synchronizes.
pub struct CytonBoard {
    port: Box<dyn serialport::SerialPort>,
    sample_rate_hz: f64,
    pending: Vec<u8>,
    streaming: bool,
}
impl CytonBoard {
    /// Opens the serial port. Fails fast on a bad path or busy port; no
    /// retries here, reconnect is the caller's decision.
    pub fn open(config: &DeviceConfig, port_name: &str) -> Result<Self, SessionError> {
        if config.num_channels > CYTON_CHANNELS {
            return Err(SessionError::Connection(format!(
                "cyton provides {CYTON_CHANNELS} channels, config asks for {}",
                config.num_channels
            )));
        }
        let port = serialport::new(port_name, BAUD_RATE)
            .timeout(Duration::from_millis(10))
            .open()
            .map_err(|e| SessionError::Connection(format!("{port_name}: {e}")))?;
        log::debug!("opened cyton on {port_name}");
        Ok(Self {
            port,
            sample_rate_hz: config.sample_rate_hz,
            pending: Vec::new(),
            streaming: false,
        })
    }
    fn command(&mut self, cmd: &[u8]) -> Result<(), SessionError> {
        use std::io::Write;
        self.port
            .write_all(cmd)
            .map_err(|e| SessionError::Stream(format!("command write failed: {e}")))
    }
    /// Moves whatever the dongle has buffered into `pending`.
    fn slurp(&mut self) -> Result<(), SessionError> {
        let available = self
            .port
            .bytes_to_read()
            .map_err(|e| SessionError::Stream(format!("bytes_to_read failed: {e}")))?
            as usize;
        if available == 0 {
            return Ok(());
        }
        let start = self.pending.len();
        self.pending.resize(start + available, 0);
        let read = self
            .port
            .read(&mut self.pending[start..])
            .map_err(|e| SessionError::Stream(format!("serial read failed: {e}")))?;
        self.pending.truncate(start + read);
        Ok(())
    }
}
/// Parses complete frames out of `pending`, leaving any tail fragment.
fn parse_frames(pending: &mut Vec<u8>) -> SampleBlock {
    let mut block = SampleBlock::empty(CYTON_CHANNELS);
    let mut pos = 0;
    while pending.len() - pos >= FRAME_LEN {
        let frame = &pending[pos..pos + FRAME_LEN];
        if frame[0] != FRAME_HEADER || frame[FRAME_LEN - 1] & 0xF0 != 0xC0 {
            pos += 1;
            continue;
        }
        for (channel, samples) in block.channels.iter_mut().enumerate() {
            let offset = 2 + channel * 3;
            let raw = decode_i24(frame[offset], frame[offset + 1], frame[offset + 2]);
            samples.push(raw as f64 * SCALE_UV);
        }
        pos += FRAME_LEN;
    }
    pending.drain(..pos);
    block
}
fn decode_i24(b0: u8, b1: u8, b2: u8) -> i32 {
    let unsigned = ((b0 as i32) << 16) | ((b1 as i32) << 8) | b2 as i32;
    if unsigned & 0x0080_0000 != 0 {
        unsigned | !0x00FF_FFFF
    } else {
        unsigned
    }
}
impl SampleSource for CytonBoard {
    fn sample_rate_hz(&self) -> f64 {
        self.sample_rate_hz
    }
    fn num_channels(&self) -> usize {
        CYTON_CHANNELS
    }
    fn start(&mut self, _buffer_size_hint: usize) -> Result<(), SessionError> {
        if !self.streaming {
            self.pending.clear();
            self.command(CMD_START)?;
            self.streaming = true;
        }
        Ok(())
    }
    fn pull(&mut self) -> Result<SampleBlock, SessionError> {
        if !self.streaming {
            return Ok(SampleBlock::empty(CYTON_CHANNELS));
        }
        self.slurp()?;
        Ok(parse_frames(&mut self.pending))
    }
    fn stop(&mut self) -> Result<SampleBlock, SessionError> {
        if !self.streaming {
            return Ok(SampleBlock::empty(CYTON_CHANNELS));
        }
        self.command(CMD_STOP)?;
        self.streaming = false;
        self.slurp()?;
        Ok(parse_frames(&mut self.pending))
    }
}
impl Drop for CytonBoard {
    fn drop(&mut self) {
        if self.streaming {
            let _ = self.command(CMD_STOP);
        }
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn i24_sign_extension() {
        assert_eq!(decode_i24(0x00, 0x00, 0x01), 1);
        assert_eq!(decode_i24(0xFF, 0xFF, 0xFF), -1);
        assert_eq!(decode_i24(0x80, 0x00, 0x00), -(1 << 23));
        assert_eq!(decode_i24(0x7F, 0xFF, 0xFF), (1 << 23) - 1);
    }
    fn frame(sample_num: u8, raw: i32) -> Vec<u8> {
        let mut out = vec![FRAME_HEADER, sample_num];
        for _ in 0..CYTON_CHANNELS {
            out.extend_from_slice(&[
                (raw >> 16) as u8,
                (raw >> 8) as u8,
                raw as u8,
            ]);
        }
        out.extend_from_slice(&[0; 6]);
        out.push(0xC0);
        out
    }
    #[test]
    fn parser_skips_garbage_and_keeps_tail_fragment() {
        let mut pending = vec![0x12, 0x34];
        pending.extend(frame(0, 100));
        pending.extend(frame(1, -100));
        let tail = frame(2, 7);
        pending.extend_from_slice(&tail[..10]);
        let block = parse_frames(&mut pending);
        assert_eq!(block.count(), 2);
        assert!((block.channels[0][0] - 100.0 * SCALE_UV).abs() < 1e-12);
        assert!((block.channels[7][1] + 100.0 * SCALE_UV).abs() < 1e-12);
        // The partial third frame stays buffered for the next pull.
        assert_eq!(pending.len(), 10);
    }
    #[test]
    fn scale_maps_full_range_to_reference_voltage() {
        let full_scale = ((1 << 23) - 1) as f64 * SCALE_UV;
        // 4.5 V / 24 gain = 187500 uV at positive full scale.
        assert!((full_scale - 187_500.0).abs() < 1.0);
    }
}
