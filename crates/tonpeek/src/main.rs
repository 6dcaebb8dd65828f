use std::io::{self, Read};

use anyhow::Context;
use clap::Parser;
use tonpeek::{
    Config, DecodedPayload, decode_payload,
    boc::{DecoderConfig, TailBits},
    ton::ExtractorConfig,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "tonpeek", version, about = "List the internal messages carried by a TON payload")]
struct Cli {
    #[arg(
        help = "BoC as base64 or hex, or a ton:// / tonconnect URL. Read from stdin when omitted"
    )]
    payload: Option<String>,

    #[arg(long, help = "Print the report as JSON")]
    json: bool,

    #[arg(long, help = "Do not verify the CRC32C trailer")]
    no_crc: bool,

    #[arg(
        long,
        help = "Read cell tails as an unused-bits count instead of a completion tag"
    )]
    literal_tail: bool,

    #[arg(
        long,
        value_name = "COUNT",
        default_value_t = DecoderConfig::DEFAULT_MAX_CELL_COUNT,
        help = "Reject BoCs declaring more cells"
    )]
    max_cells: usize,

    #[arg(long, help = "Keep only messages with a destination address")]
    require_destination: bool,
}

impl Cli {
    fn config(&self) -> Config {
        Config {
            decoder: DecoderConfig {
                max_cell_count: self.max_cells,
                verify_crc32: !self.no_crc,
                tail_bits: if self.literal_tail {
                    TailBits::Literal
                } else {
                    TailBits::Marker
                },
            },
            extractor: ExtractorConfig {
                require_destination: self.require_destination,
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    debug!(?cli, "starting");

    let payload = match &cli.payload {
        Some(payload) => payload.clone(),
        None => {
            let mut payload = String::new();
            io::stdin()
                .read_to_string(&mut payload)
                .context("read payload from stdin")?;
            payload
        }
    };

    let decoded = decode_payload(&payload, &cli.config()).context("decode payload")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&decoded).context("serialize report")?
        );
    } else {
        print_report(&decoded);
    }
    Ok(())
}

fn print_report(decoded: &DecodedPayload) {
    println!("source: {}", decoded.source);
    if let Some(hash) = &decoded.hash {
        match (&hash.hex, &hash.base64) {
            (Some(hex), Some(base64)) => println!("hash:   {hex} ({base64})"),
            _ => println!("hash:   {}", hash.note.as_deref().unwrap_or("unavailable")),
        }
    }
    println!("result: {}", decoded.reason);
    for (i, action) in decoded.actions.iter().enumerate() {
        println!();
        println!("#{} {} / {}", i + 1, action.protocol, action.action);
        if !action.summary.is_empty() {
            println!("   {}", action.summary);
        }
        if let Some(op) = action.fields.op_code {
            println!("   op code: {op:#010x}");
        }
        if let Some(notes) = &action.notes {
            println!("   {notes}");
        }
    }
}
