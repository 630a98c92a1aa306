//
// Copyright (c) 2026 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

use clap::Parser;
use gettextrs::{bind_textdomain_codeset, gettext, setlocale, textdomain, LocaleCategory};
use libflate::gzip;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tarwriter::{PackOptions, TarPacker, TarResult, DEFAULT_CHUNK_SIZE};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = gettext("maketar - write a ustar archive of directory trees"),
    long_about
)]
struct Args {
    #[arg(short = 'f', long, help = gettext("Write the archive to this file instead of standard output"))]
    archive: Option<PathBuf>,

    #[arg(short = 'z', long = "gzip", help = gettext("Compress the archive using gzip"))]
    gzip: bool,

    #[arg(long, help = gettext("Write plain tar headers without the ustar extension"))]
    no_ustar: bool,

    #[arg(long = "dirs", help = gettext("Record each subdirectory as its own entry"))]
    directory_entries: bool,

    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE, help = gettext("Bytes copied per read while archiving a file"))]
    chunk_size: usize,

    #[arg(required = true, help = gettext("Directories to archive; entries are named relative to each"))]
    dirs: Vec<PathBuf>,
}

fn init_locale() -> io::Result<()> {
    setlocale(LocaleCategory::LcAll, "");
    textdomain("posixutils-rs")?;
    bind_textdomain_codeset("posixutils-rs", "UTF-8")?;
    Ok(())
}

fn main() -> ExitCode {
    if let Err(e) = init_locale() {
        eprintln!("maketar: {}", e);
        return ExitCode::FAILURE;
    }
    env_logger::init();
    let args = Args::parse();

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("maketar: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Returns whether every file was archived in full
fn run(args: &Args) -> TarResult<bool> {
    let out: Box<dyn Write> = match &args.archive {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(io::stdout().lock()),
    };
    let out = BufWriter::new(out);

    if args.gzip {
        let (complete, encoder) = pack(args, gzip::Encoder::new(out)?)?;
        let mut out = encoder.finish().into_result()?;
        out.flush()?;
        Ok(complete)
    } else {
        let (complete, mut out) = pack(args, out)?;
        out.flush()?;
        Ok(complete)
    }
}

fn pack<W: Write>(args: &Args, sink: W) -> TarResult<(bool, W)> {
    let options = PackOptions {
        ustar: !args.no_ustar,
        directory_entries: args.directory_entries,
        chunk_size: args.chunk_size,
    };
    let mut packer = TarPacker::with_options(sink, options);

    let mut complete = true;
    for dir in &args.dirs {
        let report = packer.add_directory(dir)?;
        for failure in &report.failures {
            eprintln!("maketar: {}", failure);
        }
        complete &= report.is_complete();
    }

    packer.finish()?;
    Ok((complete, packer.into_inner()))
}
