//! RIFF/WAVE header reader.

/// Stream parameters from a WAV file's `fmt ` and `data` chunks.
#[derive(Debug, Clone, PartialEq)]
pub struct WavInfo {
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    pub byte_rate: u32,
    pub data_len: u32,
}

impl WavInfo {
    pub fn duration_secs(&self) -> f64 {
        if self.byte_rate == 0 {
            0.0
        } else {
            self.data_len as f64 / self.byte_rate as f64
        }
    }
}

fn u16_at(bytes: &[u8], pos: usize) -> Option<u16> {
    Some(u16::from_le_bytes(bytes.get(pos..pos + 2)?.try_into().ok()?))
}

fn u32_at(bytes: &[u8], pos: usize) -> Option<u32> {
    Some(u32::from_le_bytes(bytes.get(pos..pos + 4)?.try_into().ok()?))
}

/// Parse the header chunks; `None` if this is not a readable WAVE file.
pub fn parse_wav(bytes: &[u8]) -> Option<WavInfo> {
    if bytes.get(0..4)? != b"RIFF" || bytes.get(8..12)? != b"WAVE" {
        return None;
    }

    let mut fmt: Option<(u16, u32, u32, u16)> = None;
    let mut pos = 12;
    while pos + 8 <= bytes.len() {
        let id = &bytes[pos..pos + 4];
        let size = u32_at(bytes, pos + 4)?;
        let body = pos + 8;
        match id {
            b"fmt " => {
                fmt = Some((
                    u16_at(bytes, body + 2)?,
                    u32_at(bytes, body + 4)?,
                    u32_at(bytes, body + 8)?,
                    u16_at(bytes, body + 14)?,
                ));
            }
            b"data" => {
                let (channels, sample_rate, byte_rate, bits_per_sample) = fmt?;
                // Streams written before their length is known claim more than the file holds
                let available = (bytes.len() - body) as u32;
                return Some(WavInfo {
                    channels,
                    sample_rate,
                    bits_per_sample,
                    byte_rate,
                    data_len: size.min(available),
                });
            }
            _ => {}
        }
        // Chunks are word aligned
        pos = body + size as usize + (size as usize & 1);
    }
    None
}

/// `H:MM:SS.ss`
pub fn format_duration(secs: f64) -> String {
    let hours = (secs / 3600.0).floor();
    let minutes = ((secs - hours * 3600.0) / 60.0).floor();
    let seconds = secs - hours * 3600.0 - minutes * 60.0;
    format!("{}:{:02}:{:05.2}", hours as u64, minutes as u64, seconds)
}

#[cfg(test)]
pub(crate) fn build_wav(sample_rate: u32, channels: u16, bits: u16, frames: u32) -> Vec<u8> {
    let block_align = channels * bits / 8;
    let byte_rate = sample_rate * block_align as u32;
    let data_len = frames * block_align as u32;
    let mut out = Vec::new();
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&channels.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&bits.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    out.resize(out.len() + data_len as usize, 0);
    out
}
