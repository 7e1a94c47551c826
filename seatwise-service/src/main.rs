use clap::{Parser, Subcommand};
use diesel::prelude::*;
use uuid::Uuid;

use seatwise_service::lookup::VenueLookup;
use seatwise_service::schema::restaurants;
use seatwise_service::{busy_hours, establish_pool, ingest};

#[derive(Parser)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recompute the busyness grid for one restaurant, or every restaurant
    UpdateBusyHours {
        #[arg(long)]
        restaurant: Option<Uuid>,
    },
    /// Fetch venues for a city from the map-data service and upsert them
    Ingest {
        #[arg(long)]
        city: String,
    },
}

#[tokio::main]
pub async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let pool = establish_pool();
    let conn = &mut pool.get()?;

    match cli.command {
        Commands::UpdateBusyHours { restaurant } => {
            let targets = match restaurant {
                Some(id) => vec![id],
                None => restaurants::table.select(restaurants::id).load(conn)?,
            };
            for id in targets {
                busy_hours::refresh_busy_hours(conn, id)?;
                println!("refreshed busy hours for {id}");
            }
        }
        Commands::Ingest { city } => {
            let venues = VenueLookup::new().search(&city).await;
            if venues.is_empty() {
                println!("no venues found for {city}");
            }
            for venue in venues {
                let id = ingest::upsert_external_venue(conn, &venue, &city)?;
                println!("{id} {}", venue.name);
            }
        }
    }

    Ok(())
}
