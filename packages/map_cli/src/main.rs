#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for building specimen-count county maps.
//!
//! Loads a specimen table and a county boundary file, builds the cutoff-year
//! and full maps for one taxon query, and writes both as `GeoJSON` next to a
//! legend file.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use specimen_map_choropleth::{
    ColorScheme, MapDatasetBuilder, MapLegend, MapOutcome, RegionDefinition, all_regions,
    county_map_to_geojson, parse_color_ranges, parse_region_toml, region_by_id,
};
use specimen_map_spatial::boundaries::load_regions;
use specimen_map_specimen::LoadError;
use specimen_map_specimen::catalog::{DatasetSummary, families, genera, species};
use specimen_map_specimen::loader::{load_csv, load_json, load_xlsx};
use specimen_map_specimen_models::{SpecimenRecord, TaxonField, TaxonQuery};

/// Export file timestamp, e.g. `03_07_PM_10_14_2026`.
const TIMESTAMP_FORMAT: &str = "%I_%M_%p_%m_%d_%Y";

#[derive(Parser)]
#[command(name = "specimen_map", about = "Specimen occurrence county map tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print headline statistics for a specimen table
    Summary {
        /// Specimen table (`.csv`, `.xlsx`, or `.json`)
        input: PathBuf,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the taxa present in a specimen table.
    /// Lists families, or genera under `--family`, or species under both
    /// `--family` and `--genus`.
    Taxa {
        /// Specimen table (`.csv`, `.xlsx`, or `.json`)
        input: PathBuf,
        /// Family selection ("All" for any)
        #[arg(long)]
        family: Option<String>,
        /// Genus selection ("All" for any)
        #[arg(long)]
        genus: Option<String>,
    },
    /// List the embedded region definitions
    Regions,
    /// Build cutoff-year and full county maps for one taxon query
    Generate {
        /// Specimen table (`.csv`, `.xlsx`, or `.json`)
        #[arg(long)]
        input: PathBuf,
        /// County boundary `GeoJSON` `FeatureCollection`
        #[arg(long)]
        boundaries: PathBuf,
        /// Embedded region identifier
        #[arg(long, default_value = "montana")]
        region: String,
        /// Region definition TOML file (overrides `--region`)
        #[arg(long)]
        region_file: Option<PathBuf>,
        /// Family to map ("All" for any)
        #[arg(long, default_value = TaxonField::WILDCARD)]
        family: String,
        /// Genus to map ("All" for any)
        #[arg(long, default_value = TaxonField::WILDCARD)]
        genus: String,
        /// Species to map ("All" for any)
        #[arg(long, default_value = TaxonField::WILDCARD)]
        species: String,
        /// Last collection year counted by the cutoff map
        #[arg(long)]
        cutoff_year: i32,
        /// Color range replacing the region's ranges, e.g. `1-10=#e7e8e9`
        /// or `1001+=#231f20`. May be repeated.
        #[arg(long = "range")]
        ranges: Vec<String>,
        /// Color for counts no range covers (overrides the region's)
        #[arg(long)]
        default_color: Option<String>,
        /// Directory the output files are written to
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
        /// Output file name prefix
        #[arg(long, default_value = "specimen_map")]
        prefix: String,
    },
}

/// Loads a specimen table, choosing the format by file extension.
///
/// `.json` and `.xlsx`/`.xlsm` are recognized; anything else is read as CSV.
fn load_table(path: &Path) -> Result<Vec<SpecimenRecord>, LoadError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("json") => load_json(&fs::read_to_string(path)?),
        Some("xlsx" | "xlsm") => load_xlsx(BufReader::new(File::open(path)?)),
        _ => load_csv(File::open(path)?),
    }
}

fn print_listing(title: &str, values: &[String]) {
    println!("{title} ({})", values.len());
    println!("{}", "-".repeat(40));
    for value in values {
        println!("{value}");
    }
}

#[allow(clippy::too_many_lines)]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Summary { input, json } => {
            let records = load_table(&input)?;
            let summary = DatasetSummary::from_records(&records);

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("{:<20} {}", "Records", summary.total_records);
                match summary.year_range {
                    Some((first, last)) => println!("{:<20} {first}-{last}", "Years"),
                    None => println!("{:<20} none", "Years"),
                }
                println!("{:<20} {}", "Families", summary.unique_families);
                println!("{:<20} {}", "Genera", summary.unique_genera);
                println!("{:<20} {}", "Species", summary.unique_species);
            }
        }
        Commands::Taxa {
            input,
            family,
            genus,
        } => {
            let records = load_table(&input)?;

            match (family, genus) {
                (None, None) => print_listing("Families", &families(&records)),
                (Some(family), None) => {
                    print_listing("Genera", &genera(&records, &TaxonField::parse(&family)));
                }
                (family, Some(genus)) => {
                    let family = family.map_or(TaxonField::Any, |f| TaxonField::parse(&f));
                    print_listing(
                        "Species",
                        &species(&records, &family, &TaxonField::parse(&genus)),
                    );
                }
            }
        }
        Commands::Regions => {
            println!("{:<16} {:<16} SUBDIVISION", "ID", "NAME");
            println!("{}", "-".repeat(48));
            for region in &all_regions() {
                println!(
                    "{:<16} {:<16} {}",
                    region.id, region.name, region.subdivision_code
                );
            }
        }
        Commands::Generate {
            input,
            boundaries,
            region,
            region_file,
            family,
            genus,
            species,
            cutoff_year,
            ranges,
            default_color,
            output_dir,
            prefix,
        } => {
            let definition: RegionDefinition = match region_file {
                Some(path) => parse_region_toml(&fs::read_to_string(path)?)?,
                None => region_by_id(&region)?,
            };

            let scheme = ColorScheme::new(
                if ranges.is_empty() {
                    definition.color_ranges.clone()
                } else {
                    parse_color_ranges(&ranges)?
                },
                default_color.unwrap_or_else(|| definition.default_color.clone()),
            );

            let regions = load_regions(
                &fs::read_to_string(&boundaries)?,
                &definition.boundary,
                &definition.subdivision_code,
            )?;
            let builder = MapDatasetBuilder::from_definition(&definition, regions)?;

            let records = load_table(&input)?;
            let query = TaxonQuery::new(
                TaxonField::parse(&family),
                TaxonField::parse(&genus),
                TaxonField::parse(&species),
            );

            let report = builder.build(&records, &query, cutoff_year, &scheme)?;
            if !report.diagnostics.is_empty() {
                log::warn!(
                    "{} row diagnostics recorded while building maps",
                    report.diagnostics.len()
                );
            }

            let maps = match report.outcome {
                MapOutcome::Maps(maps) => maps,
                MapOutcome::NoMatchingRecords => {
                    println!("No records match {query}");
                    return Ok(());
                }
                MapOutcome::NoPointsInRegion { matched } => {
                    println!(
                        "{matched} records match {query}, but none lie inside {}",
                        definition.name
                    );
                    return Ok(());
                }
            };

            fs::create_dir_all(&output_dir)?;
            let timestamp = chrono::Local::now().format(TIMESTAMP_FORMAT);
            let stem = format!("{prefix}_{timestamp}");

            let cutoff_path = output_dir.join(format!("{stem}_cutoff.geojson"));
            fs::write(
                &cutoff_path,
                county_map_to_geojson(&maps.cutoff_map).to_string(),
            )?;

            let full_path = output_dir.join(format!("{stem}_full.geojson"));
            fs::write(&full_path, county_map_to_geojson(&maps.full_map).to_string())?;

            let legend_path = output_dir.join(format!("{stem}_legend.json"));
            fs::write(
                &legend_path,
                serde_json::to_string_pretty(&MapLegend::new(&definition.name, &maps))?,
            )?;

            log::info!(
                "Wrote {}, {} and {}",
                cutoff_path.display(),
                full_path.display(),
                legend_path.display()
            );

            println!(
                "{query}: {} specimens by {cutoff_year}, {} in total",
                maps.cutoff_map.total_points(),
                maps.full_map.total_points()
            );
        }
    }

    Ok(())
}
