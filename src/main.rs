use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use tuya_dp_rs::logging::{log_error, log_warn};
use tuya_dp_rs::util::hex::{encode_hex, parse_hex_lenient};
use tuya_dp_rs::{
    build_settings_frame, decode_frame, decode_readings, init_logger, log_info, DeviceSettings,
    TuyaError,
};

#[derive(Parser)]
#[command(name = "tuya-dp-cli")]
#[command(about = "CLI tool for Tuya datapoint frames")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a hex-encoded cluster frame and print its datapoints.
    Decode { hex: String },
    /// Print the frame that writes a full settings set.
    EncodeSettings {
        /// JSON settings file; missing fields take defaults.
        #[arg(short, long)]
        settings: Option<PathBuf>,
        #[arg(long, default_value = "1")]
        sequence: u8,
    },
}

fn main() -> anyhow::Result<()> {
    init_logger();

    let cli = Cli::parse();
    match cli.command {
        Commands::Decode { hex } => {
            let bytes = parse_hex_lenient(&hex).map_err(TuyaError::from)?;
            let frame = decode_frame(&bytes);
            let Some(header) = frame.header else {
                log_error(&format!("{} bytes is too short for a frame header", bytes.len()));
                return Err(TuyaError::FrameParseError("frame too short".to_string()).into());
            };
            log_info(&format!(
                "Frame seq {} {:?}, {} datapoints",
                header.sequence,
                header.command(),
                frame.entries.len()
            ));

            let readings = decode_readings(&bytes);
            if readings.len() < frame.entries.len() {
                log_warn(&format!(
                    "{} datapoints could not be resolved",
                    frame.entries.len() - readings.len()
                ));
            }
            let entries: Vec<_> = frame
                .entries
                .iter()
                .map(|dp| {
                    json!({
                        "id": dp.id,
                        "type": dp.type_tag,
                        "payload": encode_hex(&dp.payload),
                    })
                })
                .collect();
            let output = json!({
                "sequence": header.sequence,
                "command": header.command_id,
                "manufacturer_code": header.manufacturer_code,
                "entries": entries,
                "readings": readings,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Commands::EncodeSettings { settings, sequence } => {
            let settings = match settings {
                Some(path) => DeviceSettings::from_file(&path)?,
                None => DeviceSettings::default(),
            };
            let frame = build_settings_frame(sequence, &settings);
            log_info(&format!("Settings frame: {} bytes", frame.len()));
            println!("{}", encode_hex(&frame));
        }
    }

    Ok(())
}
