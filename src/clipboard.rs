use std::env;
use std::io::Write;

use anyhow::{Context, Result, bail};
use base64::{Engine as _, engine::general_purpose::STANDARD};

const MAX_PAYLOAD: usize = 100_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Passthrough {
    None,
    Tmux,
}

impl Passthrough {
    pub fn detect() -> Self {
        if env::var_os("TMUX").is_some() {
            Passthrough::Tmux
        } else {
            Passthrough::None
        }
    }
}

pub fn osc52_sequence(text: &str, passthrough: Passthrough) -> Result<Vec<u8>> {
    let encoded = STANDARD.encode(text.as_bytes());
    if encoded.len() > MAX_PAYLOAD {
        bail!(
            "clipboard payload too large ({} > {MAX_PAYLOAD} bytes)",
            encoded.len()
        );
    }
    let seq = format!("\x1b]52;c;{encoded}\x07");

    Ok(match passthrough {
        Passthrough::None => seq.into_bytes(),
        Passthrough::Tmux => {
            let mut wrapped = b"\x1bPtmux;".to_vec();
            for byte in seq.bytes() {
                if byte == 0x1b {
                    wrapped.extend_from_slice(b"\x1b\x1b");
                } else {
                    wrapped.push(byte);
                }
            }
            wrapped.extend_from_slice(b"\x1b\\");
            wrapped
        }
    })
}

pub fn copy(writer: &mut impl Write, text: &str, passthrough: Passthrough) -> Result<()> {
    let seq = osc52_sequence(text, passthrough)?;
    writer
        .write_all(&seq)
        .and_then(|()| writer.flush())
        .context("failed to write clipboard sequence")
}
