use anyhow::Result;
use camino::Utf8PathBuf;
use clap::Parser;

use travel_logbook::geocode::{NominatimClient, PlaceResolver};
use travel_logbook::pipeline::{self, LOOKUP_PACE};

#[derive(Parser)]
#[command(name = "travel-logbook")]
#[command(about = "Turn Google Timeline location-history exports into a travel log CSV")]
struct Args {
    /// Directory containing the monthly export files
    #[arg(value_name = "DIR", default_value = ".")]
    dir: Utf8PathBuf,

    /// Output CSV file
    #[arg(short, long, default_value = "travel_logbook.csv")]
    output: Utf8PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();

    println!("🧭 Travel Logbook Generator");

    let client = NominatimClient::new()?;
    let mut resolver = PlaceResolver::new(client);

    let summary = pipeline::run(&args.dir, &args.output, &mut resolver, LOOKUP_PACE)?;

    if summary.files == 0 {
        println!("⚠️  No timeline export files found in {}", args.dir);
        return Ok(());
    }

    println!("\n🎉 Summary:");
    println!("   Files processed: {}", summary.files);
    println!("   Trips logged: {}", summary.trips);
    println!("   File errors: {}", summary.file_errors);
    println!("\nDone! Check {} for results.", args.output);

    Ok(())
}
