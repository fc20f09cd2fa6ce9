//! plumb — send a message to the plumber.

use std::io::{Read, Write};
use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Parser;

use plumber::config::DEFAULT_PLUMB_FILE;
use plumber::message::{Message, parse_attributes};

#[derive(Parser)]
#[command(name = "plumb", version, about = "Send a message to the plumber")]
struct Args {
    /// Attributes, as a space-separated list of key=value
    #[arg(short = 'a', value_name = "ATTRS")]
    attr: Option<String>,

    /// Destination port
    #[arg(short = 'd', default_value = "")]
    dst: String,

    /// Plumb file to write the message into
    #[arg(short = 'p', value_name = "FILE", default_value = DEFAULT_PLUMB_FILE)]
    plumb: PathBuf,

    /// Source application
    #[arg(short = 's', default_value = "plumb")]
    src: String,

    /// Read data from standard input
    #[arg(short = 'i')]
    stdin: bool,

    /// Content type
    #[arg(short = 't', default_value = "text")]
    kind: String,

    /// Working directory (defaults to the current one)
    #[arg(short = 'w', value_name = "DIR")]
    wdir: Option<String>,

    /// Data to send, joined with spaces
    data: Vec<String>,
}

fn build_message(args: &Args) -> anyhow::Result<Message> {
    let attr = match &args.attr {
        Some(list) if !list.is_empty() => parse_attributes(list)?,
        _ => Vec::new(),
    };

    let wdir = match &args.wdir {
        Some(dir) if !dir.is_empty() => dir.clone(),
        _ => match std::env::current_dir() {
            Ok(dir) => dir.to_string_lossy().into_owned(),
            Err(e) => {
                eprintln!("plumb: could not get working directory: {e}");
                String::new()
            }
        },
    };

    let data = if args.stdin {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading standard input")?;
        if !buf.is_empty() {
            buf.push('\n');
        }
        buf
    } else if !args.data.is_empty() {
        args.data.join(" ")
    } else {
        bail!("no data to send to the plumber");
    };

    Ok(Message {
        attr,
        data,
        dst: args.dst.clone(),
        src: args.src.clone(),
        kind: args.kind.clone(),
        wdir,
    })
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let msg = build_message(&args)?;
    let payload = msg.encode()?;

    let mut plumb = std::fs::OpenOptions::new()
        .append(true)
        .open(&args.plumb)
        .with_context(|| format!("opening {}", args.plumb.display()))?;
    plumb
        .write_all(&payload)
        .with_context(|| format!("writing to {}", args.plumb.display()))?;
    Ok(())
}
