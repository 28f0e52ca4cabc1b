use std::io::Write;

use clap::ValueEnum;
use serde::Serialize;

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    /// Write the received bytes to stdout verbatim.
    Raw,
    Json,
    Pretty,
}

#[derive(Serialize)]
struct MessageOutput<'a> {
    instance: u32,
    channel: u64,
    length: usize,
    payload: &'a str,
}

pub fn print_message(instance: u32, channel: u64, message: &[u8], format: OutputFormat) {
    match format {
        OutputFormat::Raw => print_raw(message),
        OutputFormat::Json => {
            let preview = payload_preview(message);
            let out = MessageOutput {
                instance,
                channel,
                length: message.len(),
                payload: &preview,
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Pretty => {
            println!(
                "instance={instance} channel={channel} length={} payload={}",
                message.len(),
                payload_preview(message)
            );
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn payload_preview(payload: &[u8]) -> String {
    match std::str::from_utf8(payload) {
        Ok(text) => text.to_string(),
        Err(_) => format!("<binary {} bytes>", payload.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_payloads_get_a_placeholder_preview() {
        assert_eq!(payload_preview(&[0xFF, 0xFE]), "<binary 2 bytes>");
        assert_eq!(payload_preview(b"plain"), "plain");
    }
}
