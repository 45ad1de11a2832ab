use std::fmt::Display;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use food_rescue::entity::sea_orm_active_enums::{FoodType, MealType, ProviderType};
use food_rescue::report::{ReportTable, TableRow};
use food_rescue::{Config, FilterColumn, ListingFilter, ReportId, Store};
use serde::Serialize;
use tracing_subscriber::{prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "food-rescue", version, about = "Surplus food donation reports")]
struct Cli {
    /// Database to open; created if missing
    #[arg(long, global = true, env = "DATABASE_URL")]
    database_url: Option<String>,
    /// Print JSON instead of text tables
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the tables
    Init,
    /// Replace all data with the CSV files in a directory
    Load { dir: PathBuf },
    /// List the report catalog
    Reports,
    /// Run one report by number
    Report {
        number: u8,
        /// Reference date for the expiry analysis (YYYY-MM-DD)
        #[arg(long)]
        on: Option<NaiveDate>,
    },
    /// Search food listings
    Search {
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        provider_type: Option<ProviderType>,
        #[arg(long)]
        food_type: Option<FoodType>,
        #[arg(long)]
        meal_type: Option<MealType>,
        #[arg(long)]
        min_quantity: Option<i32>,
        /// Case-insensitive part of the food name
        #[arg(long)]
        name: Option<String>,
    },
    /// Distinct values of a filterable column, e.g. `providers.type`
    Values { column: FilterColumn },
    /// Dashboard headline numbers
    Summary,
    /// Busiest cities
    Cities,
    /// Dashboard breakdowns of claims, food items and providers
    Analytics { view: AnalyticsView },
    /// Delete a row by table and key column name
    Delete {
        table: String,
        id_column: String,
        id: i32,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum AnalyticsView {
    /// Claims per day and status
    Timeline,
    /// Claims per receiver type
    ReceiverTypes,
    /// Most claimed food items
    PopularFoods,
    /// Providers ranked by completed claims
    Providers,
}

fn handle_error<E>(error: E)
where
    E: Display,
{
    eprintln!("{error}");
    ::std::process::exit(1);
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(err) => handle_error(err),
    }
}

fn print_table(table: &ReportTable, json: bool) {
    if json {
        print_json(&table.to_records());
    } else {
        print!("{table}");
    }
}

fn print_rows<R>(rows: Vec<R>, json: bool)
where
    R: TableRow + Serialize,
{
    if json {
        print_json(&rows);
    } else {
        print_table(&ReportTable::from_rows(rows), false);
    }
}

async fn run(cli: Cli) -> food_rescue::Result<()> {
    let mut config = Config::from_env()?;
    if let Some(url) = cli.database_url {
        config.database_url = url;
    }
    let store = Store::connect(&config).await?;
    let json = cli.json;

    match cli.command {
        Commands::Init => println!("database ready"),
        Commands::Load { dir } => {
            let report = store.load_csv_dir(&dir).await?;
            if json {
                print_json(&report);
            } else {
                println!(
                    "loaded {} providers, {} receivers, {} food listings, {} claims",
                    report.providers, report.receivers, report.food_listings, report.claims
                );
            }
        }
        Commands::Reports => {
            let reports = store.list_reports();
            if json {
                print_json(&reports);
            } else {
                for info in reports {
                    println!("{:>2}. {} - {}", info.id, info.name, info.description);
                }
            }
        }
        Commands::Report { number, on } => {
            let id = ReportId::from_number(number)?;
            let table = store.run_report_on(id, on.unwrap_or_else(Store::today)).await?;
            if !json {
                println!("{}\n", id.name());
            }
            print_table(&table, json);
        }
        Commands::Search {
            city,
            provider_type,
            food_type,
            meal_type,
            min_quantity,
            name,
        } => {
            let filter = ListingFilter {
                city,
                provider_type,
                food_type,
                meal_type,
                min_quantity,
                name_contains: name,
            };
            let rows = store.search_food_listings(&filter).await?;
            if json {
                print_json(&rows);
            } else {
                print_table(&ReportTable::from_rows(rows), false);
            }
        }
        Commands::Values { column } => {
            let values = store.unique_values(column).await?;
            if json {
                print_json(&values);
            } else {
                for value in values {
                    println!("{value}");
                }
            }
        }
        Commands::Summary => {
            let summary = store.summary().await?;
            if json {
                print_json(&summary);
            } else {
                println!("providers          {}", summary.total_providers);
                println!("receivers          {}", summary.total_receivers);
                println!("food listings      {}", summary.total_food_listings);
                println!("listed quantity    {}", summary.total_quantity);
                println!(
                    "claims             {} ({} pending, {} completed, {} cancelled)",
                    summary.total_claims,
                    summary.pending_claims,
                    summary.completed_claims,
                    summary.cancelled_claims
                );
                println!("completion rate    {:.2}%", summary.completion_rate);
                println!(
                    "rescued quantity   {} ({:.2}%)",
                    summary.rescued_quantity, summary.rescue_rate
                );
                for bucket in &summary.expiry {
                    println!(
                        "{:<18} {} items, {} units",
                        bucket.bucket.to_string(),
                        bucket.item_count,
                        bucket.total_quantity
                    );
                }
            }
        }
        Commands::Cities => print_rows(store.city_activity().await?, json),
        Commands::Analytics { view } => match view {
            AnalyticsView::Timeline => print_rows(store.claim_timeline().await?, json),
            AnalyticsView::ReceiverTypes => print_rows(store.claims_by_receiver_type().await?, json),
            AnalyticsView::PopularFoods => print_rows(store.popular_food_items().await?, json),
            AnalyticsView::Providers => print_rows(store.provider_performance().await?, json),
        },
        Commands::Delete {
            table,
            id_column,
            id,
        } => {
            let deleted = store.delete_record(&table, &id_column, id).await?;
            if json {
                print_json(&serde_json::json!({ "deleted": deleted }));
            } else {
                println!("deleted {deleted} row(s)");
            }
        }
    }

    store.close().await
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("food_rescue=warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    run(cli).await.unwrap_or_else(handle_error);
}
