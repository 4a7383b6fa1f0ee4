//! Parameter and modulation hub listing.

use clap::Args;
use jovian_synth::{ModDestination, Param};

#[derive(Args)]
pub struct ParamsArgs {
    /// List modulation hub destinations instead of parameters
    #[arg(long)]
    hub: bool,
}

pub fn run(args: ParamsArgs) -> anyhow::Result<()> {
    if args.hub {
        print_hub();
    } else {
        print_params();
    }
    Ok(())
}

fn print_params() {
    println!("{:>3}  {:<10} {:<18} {:>9} {:>7}  {}", "ID", "NAME", "KEY", "RANGE", "DEFAULT", "VALUES");
    for param in Param::ALL {
        let d = param.descriptor();
        let values = if d.choices.is_empty() {
            d.unit.suffix().to_string()
        } else {
            d.choices.join(" ")
        };
        println!(
            "{:>3}  {:<10} {:<18} {:>9} {:>7}  {}",
            param.index(),
            d.name,
            d.string_id,
            format!("{}..{}", d.min, d.max),
            d.default,
            values
        );
    }
}

fn print_hub() {
    println!("{:>3}  {:<10} {:<16} {:>9} {:>7}  {}", "IDX", "NAME", "KEY", "NATIVE", "RAW DEF", "VALUES");
    for dest in ModDestination::ALL {
        let d = dest.descriptor();
        let values = if d.choices.is_empty() {
            d.unit.suffix().to_string()
        } else {
            d.choices.join(" ")
        };
        println!(
            "{:>3}  {:<10} {:<16} {:>9} {:>7}  {}",
            dest.index(),
            d.name,
            d.string_id,
            format!("{}..{}", d.min, d.max),
            d.default_raw,
            values
        );
    }
}
