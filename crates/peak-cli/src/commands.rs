use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::{info, info_span};

use peak_cli::pipeline::{N50Source, load_sources, merge, save_output};
use peak_cli::review::{review_rows, save_review};
use peak_fetch::{FetchClient, Municipality, MunicipalityQuery};
use peak_match::MatchConfig;
use peak_osm::OsmDocument;

use crate::cli::{EndpointArgs, LookupArgs, MergeArgs};
use crate::types::{MergeResult, SourceCounts};

pub fn run_lookup(args: &LookupArgs) -> Result<()> {
    let client = fetch_client(&args.endpoints)?;
    let query = MunicipalityQuery::parse(&args.municipality);
    let municipality = client
        .municipality(&query)
        .with_context(|| format!("look up municipality '{}'", args.municipality))?;
    println!("Municipality: {municipality}");
    println!("SSR input: {}", municipality.ssr_file_name());
    println!("N50 archive: {}", client.n50_url(&municipality)?);
    println!("N50 entry: {}", municipality.n50_elevation_entry());
    println!("Output: {}", municipality.output_file_name());
    Ok(())
}

pub fn run_merge(args: &MergeArgs) -> Result<MergeResult> {
    let config = load_config(args.config.as_deref())?;
    let municipality = resolve_municipality(args)?;
    let span = info_span!("merge", municipality = %municipality);
    let _guard = span.enter();

    let ssr = args
        .ssr
        .clone()
        .unwrap_or_else(|| args.input_dir.join(municipality.ssr_file_name()));
    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(municipality.output_file_name()));

    let mut document = match &args.osm {
        Some(path) => OsmDocument::read(path)
            .with_context(|| format!("read existing OSM peaks from {}", path.display()))?,
        None => {
            let xml = fetch_client(&args.endpoints)?
                .download_peaks(&municipality.id)
                .context("download existing OSM peaks")?;
            OsmDocument::parse(&xml).context("parse Overpass response")?
        }
    };

    let entry = municipality.n50_elevation_entry();
    let downloaded;
    let n50 = match (&args.n50, &args.n50_zip) {
        (Some(path), _) => N50Source::OsmFile(path),
        (None, Some(path)) => N50Source::ArchiveFile {
            path,
            entry: &entry,
        },
        (None, None) => {
            downloaded = fetch_client(&args.endpoints)?
                .download_n50(&municipality)
                .context("download N50 map data")?;
            N50Source::Archive {
                bytes: &downloaded,
                entry: &entry,
            }
        }
    };

    let sets = load_sources(&ssr, n50, &mut document)?;
    let sources = SourceCounts {
        authority: sets.authority.len(),
        topo: sets.topo.len(),
        existing: sets.existing.len(),
    };
    let output = merge(sets, document, &config)?;
    save_output(&output, &output_path)?;

    let rows = review_rows(&output.sets, &output.document);
    if let Some(path) = &args.review_csv {
        save_review(path, &rows)?;
        info!(path = %path.display(), rows = rows.len(), "saved review list");
    }

    Ok(MergeResult {
        municipality,
        output: output_path,
        review_csv: args.review_csv.clone(),
        sources,
        reports: output.reconciliation.reports.clone(),
        modified: output.document.modified_count(),
        added: output.added_ids.len(),
        review_rows: rows.len(),
    })
}

fn load_config(path: Option<&Path>) -> Result<MatchConfig> {
    match path {
        Some(path) => MatchConfig::load(path)
            .with_context(|| format!("load match config from {}", path.display())),
        None => Ok(MatchConfig::default()),
    }
}

fn resolve_municipality(args: &MergeArgs) -> Result<Municipality> {
    let query = MunicipalityQuery::parse(&args.municipality);
    match (&query, &args.municipality_name) {
        (MunicipalityQuery::Number(id), Some(name)) => Ok(Municipality::new(id.as_str(), name)),
        (MunicipalityQuery::Name(_), Some(_)) => {
            bail!("--municipality-name needs a municipality number, got '{}'", args.municipality)
        }
        (_, None) => fetch_client(&args.endpoints)?
            .municipality(&query)
            .with_context(|| format!("look up municipality '{}'", args.municipality)),
    }
}

fn fetch_client(endpoints: &EndpointArgs) -> Result<FetchClient> {
    let client = FetchClient::with_endpoints(&endpoints.geonorge_url, &endpoints.overpass_url)
        .context("create HTTP client")?;
    Ok(client.with_n50_url(&endpoints.n50_url))
}
