//! SLIP framing (RFC 1055), used to delimit OSC packets on a TCP stream
//! when the OSC 1.1 wire variant is selected. Frames carry an END byte on
//! both sides; END and ESC bytes inside the payload are escaped.

pub const END: u8 = 0xC0;
pub const ESC: u8 = 0xDB;
pub const ESC_END: u8 = 0xDC;
pub const ESC_ESC: u8 = 0xDD;

/// Encode one packet as a SLIP frame, END-delimited on both sides.
pub fn encode(payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + 2);
    out.push(END);
    for &b in payload {
        match b {
            END => {
                out.push(ESC);
                out.push(ESC_END);
            }
            ESC => {
                out.push(ESC);
                out.push(ESC_ESC);
            }
            _ => out.push(b),
        }
    }
    out.push(END);
    out
}

/// Incremental SLIP decoder. Feed it socket reads as they arrive and it
/// returns the frames each chunk completes, in order. Frame boundaries may
/// fall anywhere inside a chunk. Empty frames (back-to-back END bytes, as
/// produced by double-ended senders) are dropped.
#[derive(Default)]
pub struct SlipDecoder {
    frame: Vec<u8>,
    escaped: bool,
}

impl SlipDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes accumulated for the frame currently in progress. Callers use
    /// this to cap how much an unterminated frame may buffer.
    pub fn buffered(&self) -> usize {
        self.frame.len()
    }

    /// Consume a chunk of bytes, returning every frame it completes.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<Vec<u8>> {
        let mut frames = Vec::new();
        for &b in bytes {
            if self.escaped {
                let decoded = match b {
                    ESC_END => END,
                    ESC_ESC => ESC,
                    // Invalid escape: keep the byte and carry on
                    other => other,
                };
                self.frame.push(decoded);
                self.escaped = false;
            } else {
                match b {
                    END => {
                        if !self.frame.is_empty() {
                            frames.push(std::mem::take(&mut self.frame));
                        }
                    }
                    ESC => self.escaped = true,
                    other => self.frame.push(other),
                }
            }
        }
        frames
    }
}
