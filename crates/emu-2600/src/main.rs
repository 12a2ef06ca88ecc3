//! Headless VCS runner.
//!
//! Loads a cartridge, runs a number of frames, reports the television
//! state, and optionally saves a screenshot. The interactive debugger
//! and windowed front-ends live elsewhere; this binary is the smallest
//! useful consumer of the core.

use std::path::{Path, PathBuf};
use std::process;

use emu_2600::capture::{self, Screen};
use emu_2600::{Basic, Cartridge, StateReq, SymbolTable, Television, TvType, Vcs};

struct CliArgs {
    rom_path: Option<PathBuf>,
    frames: i32,
    tv_type: TvType,
    screenshot_path: Option<PathBuf>,
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        rom_path: None,
        frames: 200,
        tv_type: TvType::Auto,
        screenshot_path: None,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--rom" => {
                i += 1;
                cli.rom_path = args.get(i).map(PathBuf::from);
            }
            "--frames" => {
                i += 1;
                if let Some(s) = args.get(i) {
                    cli.frames = s.parse().unwrap_or(200);
                }
            }
            "--spec" => {
                i += 1;
                cli.tv_type = match args.get(i).map(String::as_str) {
                    Some("ntsc") => TvType::Ntsc,
                    Some("pal") => TvType::Pal,
                    _ => TvType::Auto,
                };
            }
            "--screenshot" => {
                i += 1;
                cli.screenshot_path = args.get(i).map(PathBuf::from);
            }
            "--help" | "-h" => {
                print_usage();
                process::exit(0);
            }
            other => {
                eprintln!("unknown argument: {other}");
                print_usage();
                process::exit(2);
            }
        }
        i += 1;
    }

    cli
}

fn print_usage() {
    eprintln!("usage: emu-2600 --rom <file> [--frames <n>] [--spec ntsc|pal|auto] [--screenshot <file>]");
}

fn run(cli: &CliArgs) -> Result<(), String> {
    let rom_path = cli.rom_path.as_deref().ok_or("no ROM specified")?;
    let rom = std::fs::read(rom_path).map_err(|e| format!("{}: {e}", rom_path.display()))?;

    let cartridge = Cartridge::attach(rom).map_err(|e| e.to_string())?;
    println!(
        "{}: mapper {}, {} bank(s)",
        rom_path.display(),
        cartridge.id(),
        cartridge.num_banks()
    );

    let symbols = SymbolTable::from_cartridge(rom_path).unwrap_or_else(|e| {
        eprintln!("{e}");
        SymbolTable::standard()
    });
    if !symbols.locations.is_empty() {
        println!("{} location symbols", symbols.locations.len());
    }

    let mut tv = Basic::new(cli.tv_type);
    let (screen, frame) = Screen::new();
    tv.add_renderer(Box::new(screen));

    let mut vcs = Vcs::new(Box::new(tv));
    vcs.attach(cartridge).map_err(|e| e.to_string())?;

    vcs.run_frames(cli.frames).map_err(|e| e.to_string())?;

    println!(
        "{}: frame {}, scanline {}, visible {}..{}{}",
        vcs.tv.spec().id,
        vcs.tv_state(StateReq::Framenum).map_err(|e| e.to_string())?,
        vcs.tv_state(StateReq::Scanline).map_err(|e| e.to_string())?,
        vcs.tv_state(StateReq::VisibleTop).map_err(|e| e.to_string())?,
        vcs.tv_state(StateReq::VisibleBottom).map_err(|e| e.to_string())?,
        if vcs.tv.out_of_spec() {
            " (out of spec)"
        } else {
            ""
        }
    );

    if let Some(path) = cli.screenshot_path.as_deref() {
        save_screenshot(&frame.borrow(), path)?;
        println!("screenshot: {}", path.display());
    }

    Ok(())
}

fn save_screenshot(frame: &capture::Frame, path: &Path) -> Result<(), String> {
    capture::save_screenshot(frame, path).map_err(|e| format!("{}: {e}", path.display()))
}

fn main() {
    env_logger::init();

    let cli = parse_args();
    if let Err(err) = run(&cli) {
        eprintln!("emu-2600: {err}");
        process::exit(1);
    }
}
