//! Command-line argument parsing, in the small hand-rolled handler-table
//! style rather than pulling in an argument-parsing crate for two flags.

use std::env::{args_os, ArgsOs};
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Default)]
pub struct Args {
    /// path to a settings file, overriding the platform default
    pub config: Option<PathBuf>,
}

impl Args {
    pub fn from_env_or_exit() -> Self {
        let mut this = Self::default();

        let mut args = args_os();
        if args.next().is_none() {
            return this;
        }

        while let Some(hdr_os) = args.next() {
            let handler_info = HANDLER_TABLE.iter().find(|p| hdr_os == p.0);

            if let Some((hdr, handler)) = handler_info {
                handler.handle(&mut this, hdr, &mut args);
            } else {
                if let Some(hdr) = hdr_os.to_str() {
                    eprintln!("error: found an unexpected argument '{hdr}'");
                } else {
                    eprintln!("error: found an unexpected argument");
                }
                std::process::exit(1);
            }
        }

        this
    }
}

static HANDLER_TABLE: &[(&str, &(dyn ArgHandler<Args> + Send + Sync))] = &[
    ("-h", &(handle_help as fn(&mut Args))),
    ("--help", &(handle_help as fn(&mut Args))),
    ("--config", &(handle_config as fn(&mut Args, OsString))),
];

fn display_help_and_exit() -> ! {
    println!(
        "OpenSmoothScroll
Intercepts the mouse wheel and replays it as a smooth, physics-based scroll.

USAGE:
    smoothscroll-cli [OPTIONS]

FLAGS:
    -h, --help            display help information

OPTIONS:
    --config <PATH>       path to a settings.toml file (default: platform config dir)"
    );
    std::process::exit(0);
}

trait ArgHandler<Ctx> {
    fn handle(&self, ctx: &mut Ctx, arg_hdr: &str, args_iter: &mut ArgsOs);
}

impl<Ctx> ArgHandler<Ctx> for fn(&mut Ctx) {
    fn handle(&self, ctx: &mut Ctx, _arg_hdr: &str, _args_iter: &mut ArgsOs) {
        self(ctx);
    }
}

impl<Ctx> ArgHandler<Ctx> for fn(&mut Ctx, OsString) {
    fn handle(&self, ctx: &mut Ctx, arg_hdr: &str, args_iter: &mut ArgsOs) {
        if let Some(value) = args_iter.next() {
            self(ctx, value);
        } else {
            eprintln!("error: the argument '{arg_hdr}' requires a value");
            std::process::exit(1);
        }
    }
}

fn handle_help<T>(_: &mut T) {
    display_help_and_exit();
}

fn handle_config(args: &mut Args, value: OsString) {
    args.config = Some(value.into());
}
